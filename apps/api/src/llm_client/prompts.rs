// Prompt constants shared by every assistant action.

/// System role for every request.
pub const SYSTEM: &str = "You are an expert ATS resume analyzer and career coach.";

/// Stands in for the résumé body when the résumé is sent as an image part.
pub const RESUME_ATTACHED: &str = "(attached as an image of the first page)";

pub const ANALYZE: &str =
    "Analyze the resume and job description. Provide detailed, actionable feedback.";

pub const IMPROVE: &str = "Suggest concrete skill improvements and certifications.";

/// The match action asks for a fixed `Match Percentage: XX%` line; the
/// interpreter in `matching` depends on that label.
pub const MATCH: &str = "\
Evaluate the resume against the job description.
Output format:
- Match Percentage: XX%
- Missing Keywords: [List missing skills/tools]
- Final Thoughts: Summary of strengths, weaknesses, recommendation.";

/// Cold email template. Replace `{linkedin}`, `{tone}`, `{resume}` and `{job_description}`.
pub const COLD_EMAIL_TEMPLATE: &str = "\
Write a professional cold email for a job opportunity.

LinkedIn: {linkedin}
Tone: {tone}

Resume:
{resume}

Job Description:
{job_description}";

/// Builds the user message: job description, résumé, then the task.
pub fn user_message(job_description: &str, resume: &str, instructions: &str) -> String {
    format!("Job Description:\n{job_description}\n\nResume:\n{resume}\n\nTask:\n{instructions}")
}
