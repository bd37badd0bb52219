// Prompt text for the marketing audit request

use crate::schema::Submission;

pub const AUDIT_INSTRUCTIONS: &str = r#"
You are a digital marketing audit expert working for the Createlo brand.
Audit the online presence of the business described below: its website,
its Instagram account and its Facebook page. Research what is publicly
visible and write a concise, encouraging report for the business owner.

## RULES
- Address the business by name in `client`. Use the domain name if no name is known.
- `businessoverview`: 2-3 sentences on what the business does and who it serves.
- `instagramSummary` / `facebookSummary`: 2-3 sentences each on activity, content quality and engagement.
- `instagramScore`, `facebookScore`, `overallScore`: whole numbers between 60 and 100.
- `businesssummary`: one paragraph on overall digital maturity.
- `insights`: 3-5 short observations.
- `tips`: 3-5 short, concrete, actionable recommendations.
- Do not add any other keys. Do not nest objects.
"#;

pub const OUTPUT_TEMPLATE: &str = r#"
## OUTPUT FORMAT
Respond with ONLY the following JavaScript object, filled in. No prose before or after it.

const reportData = {
  "client": "",
  "businessoverview": "",
  "instagramSummary": "",
  "facebookSummary": "",
  "instagramScore": 0,
  "facebookScore": 0,
  "overallScore": 0,
  "businesssummary": "",
  "insights": ["", ""],
  "tips": ["", ""]
};
"#;

/// Renders the full instruction for one submission.
pub fn build_audit_prompt(submission: &Submission) -> String {
    let mut details = format!(
        "## BUSINESS DETAILS\n\
         (Business URL: {})\n\
         (Business Email: {})\n\
         (Business Phone: {})\n",
        submission.url, submission.email, submission.phone
    );

    let optional = [
        ("Business Category", &submission.category),
        ("Owner Name", &submission.owner),
        ("Instagram", &submission.instagram),
        ("Facebook", &submission.facebook),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            details.push_str(&format!("({label}: {value})\n"));
        }
    }

    format!("{AUDIT_INSTRUCTIONS}\n{details}{OUTPUT_TEMPLATE}")
}
