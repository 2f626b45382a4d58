// Prompt constants for resume scoring.

/// System prompt for resume scoring. Forces a bare number.
pub const SCORE_SYSTEM: &str = "You are an expert HR professional. \
    Provide only a single numeric score between 1 and 10, based on the analysis.";

/// Scoring prompt template. Replace `{job_description}` and `{resume_text}` before sending.
pub const SCORE_PROMPT_TEMPLATE: &str = r#"You are a recruiter assessing the attached resume against the provided job description. Analyze the resume objectively, highlighting matches and achievements, as well as missing aspects.

Consider the following parameters critically:
1. **Key Skills**: Match with JD.
2. **Academic Qualifications**: Required qualifications vs. actual qualifications. Lower scores for irrelevant fields.
3. **Achievements**: Relevant achievements to the JD. Non-relevant achievements lower the score.
4. **Responsibilities**: Match responsibilities.
5. **Years of Experience**: Required vs. actual experience, especially for specified roles or technologies.
6. **Industry**: Relevance of the candidate's industry experience to the job opening.

Provide a single numeric overall score from 1 to 10 as response, where 1 is no match and 10 is a perfect match. Give more weight to critical parameters in your scoring. Your analysis should be crisp and based on current experience and capabilities, not future possibilities.

Job Description:
{job_description}

Resume:
{resume_text}

Score:"#;

pub fn build_score_prompt(resume_text: &str, job_description: &str) -> String {
    SCORE_PROMPT_TEMPLATE
        .replace("{job_description}", job_description)
        .replace("{resume_text}", resume_text)
}
