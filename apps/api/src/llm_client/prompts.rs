// Prompt templates sent to the model, plus the context framing the response
// parsers depend on. Changing the percentage-match or fit-for-role wording
// changes what `screening::parser` can recover from the reply.

use crate::models::screening::Action;

/// Asks for a five-line candidate summary. Sent with the raw resume text only.
pub const SUMMARY_PROMPT: &str = "\
You are an experienced Technical Human Resource Manager, your task is to review the provided resume \
and give only the summary of the resume in very short like their skills, current position, \
if he/she is studying give as a fresher, give response like that and build a context about the candidate with in 5 lines.";

/// Asks for `<n>%`, then `Keywords Missing:`, then `Final Thoughts:`.
pub const PERCENTAGE_MATCH_PROMPT: &str = "\
You are a skilled ATS (Applicant Tracking System) scanner with a deep understanding of data science and ATS functionality, \
your task is to evaluate the \"RESUME DATA\" against the provided \"JOB DESCRIPTION\". give me the percentage of match if the \"RESUME DATA\" matches \
the \"JOB DESCRIPTION\". First, the output should come as a percentage (Give Just percentage with percentage symbol, no need of any words), \
then keywords missing (use 'Keywords Missing: ' keyword) for this give the missed values from \"JOB DESCRIPTION\" by comparing with \"RESUME DATA\" \
if missed give the missed values, if nothing is missed then give 'None' for 'Keywords Missing:', \
and lastly, final thoughts (use 'Final Thoughts: ' keyword) in a short manner.";

/// Asks for a leading `Yes`/`No` followed by the reason.
pub const FIT_FOR_ROLE_PROMPT: &str = "\
Below I have given you the 1)\"JOB DESCRIPTION\" and 2) \"RESUME DATA\". I want you to compare whether the \"RESUME DATA\" is Relatable for the given \"JOB DESCRIPTION\" \
and if the \"RESUME DATA\" is relatable to provided \"JOB DESCRIPTION\", Just say 'Yes' or 'No' and the reason for Yes/No.";

/// Free-form relatability prompt. Listed in the prompt catalogue only: the
/// filter action needs a parseable verdict, so it sends `FIT_FOR_ROLE_PROMPT`.
pub const FILTER_PROMPT: &str = "\
Below I have given you the 1)\"JOB DESCRIPTION\" and 2) \"RESUME DATA\". I want you to compare whether the \"RESUME DATA\" is more or less relatable for the given \"JOB DESCRIPTION\". \
If the \"RESUME DATA\" is relatable to provided \"JOB DESCRIPTION\", just give the reason for relatable in very short.";

/// Instruction prompt sent for `action`. Filter reuses the fit-for-role prompt.
pub fn prompt_for(action: Action) -> &'static str {
    match action {
        Action::Summary => SUMMARY_PROMPT,
        Action::PercentageMatch => PERCENTAGE_MATCH_PROMPT,
        Action::FitForRole | Action::Filter => FIT_FOR_ROLE_PROMPT,
    }
}

const JOB_DESCRIPTION_LABEL: &str = "\"JOB DESCRIPTION\": ";
const RESUME_DATA_LABEL: &str = "\"RESUME DATA\": \n";

pub fn job_description_context(job_description: &str) -> String {
    format!("{JOB_DESCRIPTION_LABEL}{job_description}")
}

pub fn resume_context(resume_text: &str) -> String {
    format!("{RESUME_DATA_LABEL}{resume_text}")
}

/// `[prompt, job description, resume]` in the order the model expects.
pub fn assessment_parts(prompt: &str, job_description: &str, resume_text: &str) -> Vec<String> {
    vec![
        prompt.to_string(),
        job_description_context(job_description),
        resume_context(resume_text),
    ]
}

/// `[summary prompt, resume]`; the summary sees the raw text without framing.
pub fn summary_parts(resume_text: &str) -> Vec<String> {
    vec![prompt_for(Action::Summary).to_string(), resume_text.to_string()]
}
