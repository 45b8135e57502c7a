//! Keyword inference of the industry template bucket.
//!
//! Rules are checked top to bottom and the first one whose keyword appears in
//! the lower-cased description wins. Order matters: "tech clothing" is a
//! fashion description, not a technology one.

use crate::state::PromptRequest;

/// One fixed (industry, audience, business) triple used to fill the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateBucket {
    pub industry: &'static str,
    pub audience: &'static str,
    pub business: &'static str,
}

impl TemplateBucket {
    /// Copy of `request` with the inferred fields filled in.
    pub fn apply(&self, request: &PromptRequest) -> PromptRequest {
        PromptRequest {
            business_name: self.business.to_string(),
            industry: self.industry.to_string(),
            target_audience: self.audience.to_string(),
            ..request.clone()
        }
    }
}

pub const FASHION_RETAIL: TemplateBucket = TemplateBucket {
    industry: "Fashion Retail",
    audience: "Fashion-conscious shoppers",
    business: "StyleSense",
};

pub const TECHNOLOGY: TemplateBucket = TemplateBucket {
    industry: "Technology",
    audience: "Tech professionals",
    business: "TechFlow",
};

pub const FOOD_AND_BEVERAGE: TemplateBucket = TemplateBucket {
    industry: "Food & Beverage",
    audience: "Food enthusiasts",
    business: "FlavourFusion",
};

pub const E_COMMERCE: TemplateBucket = TemplateBucket {
    industry: "E-commerce",
    audience: "Online shoppers",
    business: "SmartServe",
};

/// A keyword rule: any keyword contained in the input selects the bucket.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub keywords: &'static [&'static str],
    pub bucket: TemplateBucket,
}

impl Rule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k))
    }
}

/// Priority-ordered rules. Keywords are lower-case.
pub const RULES: &[Rule] = &[
    Rule { keywords: &["fashion", "clothing"], bucket: FASHION_RETAIL },
    Rule { keywords: &["tech", "software"], bucket: TECHNOLOGY },
    Rule { keywords: &["food", "restaurant"], bucket: FOOD_AND_BEVERAGE },
];

/// Used when no rule matches.
pub const DEFAULT_BUCKET: TemplateBucket = E_COMMERCE;

/// Pick the bucket for a free-text description.
pub fn infer(use_case: &str) -> &'static TemplateBucket {
    let lowered = use_case.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| &rule.bucket)
        .unwrap_or(&DEFAULT_BUCKET)
}
