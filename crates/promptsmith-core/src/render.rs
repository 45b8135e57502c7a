use chrono::{DateTime, Utc};

use crate::state::{iso_timestamp, PromptRequest, PromptResult};
use crate::template;

/// Fill the fixed prompt skeleton with the request's fields.
///
/// The skeleton never changes shape; only the named entities and the
/// "Context and Requirements" block vary. `additional_context`, when present,
/// continues that block on the next line.
pub fn render_prompt(request: &PromptRequest) -> String {
    let business = &request.business_name;
    let industry = &request.industry;
    let audience = &request.target_audience;

    let mut context = request.use_case.clone();
    if !request.additional_context.is_empty() {
        context.push('\n');
        context.push_str(&request.additional_context);
    }

    format!(
        "You are an AI assistant for {business}, a company in the {industry} industry.

Your primary goal is to help {audience} with their needs.

Context and Requirements:
{context}

When responding to users:
1. Maintain a professional, helpful tone consistent with {business}'s brand
2. Provide specific, actionable information related to user queries
3. Consider the needs and knowledge level of {audience}
4. Focus solutions on the specific industry context of {industry}
5. Address customer concerns with empathy and precision

Always prioritize accuracy, clarity, and customer satisfaction in your responses."
    )
}

pub fn result_title(industry: &str) -> String {
    format!("{} AI Assistant Prompt", industry)
}

pub fn result_description(industry: &str) -> String {
    format!("AI-optimized prompt for {} businesses", industry)
}

/// Infer the template bucket for `request` and build the finished result.
pub fn build_result(request: &PromptRequest, at: DateTime<Utc>) -> PromptResult {
    let bucket = template::infer(&request.use_case);
    let filled = bucket.apply(request);

    PromptResult {
        title: result_title(bucket.industry),
        prompt: render_prompt(&filled),
        description: result_description(bucket.industry),
        timestamp: iso_timestamp(at),
    }
}
