// Prompt text for the gated operations.

use serde_json::Value;

use crate::models::{ChatKind, ChatRequest, TrendsRequest};

const SUPPLIER_LINE: &str = "SUPPLIER: [Company Name] | [Location] | [Speciality]";

pub fn chat_prompt(req: &ChatRequest) -> String {
    match req.kind {
        ChatKind::OpportunityInsight => opportunity_insight_prompt(&req.data),
        ChatKind::TrendExploration => {
            trend_exploration_prompt(req.query.as_deref().unwrap_or_default(), &req.data)
        }
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn opportunity_insight_prompt(data: &Value) -> String {
    format!(
        "Analyze this opportunity and provide crisp, actionable insights: {data}.

**Requirements:**
- Keep response under 200 words
- Do NOT include any rec_id, trend_id, or technical IDs
- Focus on business value and actionability
- Include relevant supplier connections

**Format:**
## Why This Opportunity
Brief compelling overview (2-3 sentences)

## Market Advantages
- 2-3 key strengths (bullet points)

## Next Steps
- 2-3 specific actions to take

## Connect with Suppliers
List 2-3 relevant supplier types for this opportunity in this format:
{SUPPLIER_LINE}

Keep it concise and business-focused.",
        data = pretty(data),
    )
}

fn trend_exploration_prompt(query: &str, opportunities: &Value) -> String {
    format!(
        "User Query: \"{query}\"

Using this opportunity data: {data}

**Requirements:**
- Keep response under 250 words
- Do NOT include any rec_id, trend_id, or technical IDs
- Focus on top 2-3 most relevant opportunities
- Include supplier connections for each recommendation

**Format:**
## Top Opportunities for You

### [Opportunity 1 Name]
Brief why it fits (1-2 sentences)
- Key advantage 1
- Key advantage 2

### [Opportunity 2 Name]
Brief why it fits (1-2 sentences)
- Key advantage 1
- Key advantage 2

## Connect with Suppliers
For each opportunity, list relevant suppliers in this format:
{SUPPLIER_LINE}

Keep it crisp and actionable.",
        data = pretty(opportunities),
    )
}

fn joined_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

pub fn trends_prompt(req: &TrendsRequest) -> String {
    format!(
        "You are an expert market analyst for small manufacturers in India.
Analyze the user's query and provide ranked market opportunities.

User Context:
- Location: {location}
- Budget: {budget}
- Available Processes: {processes}
- Certifications: {certifications}
- Target Brands: {brands}
- Industries of Interest: {industries}

Query: {query}

Provide ONLY a JSON response with this exact structure:
{{
  \"opportunities\": [
    {{
      \"rank\": 1,
      \"title\": \"Brief descriptive title\",
      \"product_category\": \"Category name\",
      \"geography\": \"City, State\",
      \"score\": 85,
      \"why\": \"Detailed explanation tied to user context and market trends\",
      \"steps\": [\"Step 1\", \"Step 2\", \"Step 3\", \"Step 4\", \"Step 5\"],
      \"required_setup\": [\"Equipment needed\", \"Certification needed\"],
      \"suggested_brands\": [\"Brand1\", \"Brand2\", \"Brand3\"],
      \"supplier_keywords\": [\"keyword1\", \"keyword2\"]
    }}
  ]
}}

Focus on practical, actionable opportunities relevant to Indian manufacturing. Rank by viability and market potential.",
        location = req.location.as_deref().filter(|s| !s.is_empty()).unwrap_or("India"),
        budget = req.budget.as_deref().filter(|s| !s.is_empty()).unwrap_or("Flexible"),
        processes = joined_or(&req.processes, "Various"),
        certifications = joined_or(&req.certifications, "Standard"),
        brands = joined_or(&req.target_brands, "Open"),
        industries = joined_or(&req.industries, "Multiple"),
        query = req.query_text,
    )
}
