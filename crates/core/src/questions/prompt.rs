//! Instruction text for the language model.
//! Everything here is plain string building: same input, same prompt.

/// System instruction sent alongside the question prompt.
pub const QUESTION_SYSTEM_INSTRUCTION: &str = "You are an assistant that writes study questions FOR A STUDENT.
IMPORTANT: Your output MUST start directly with the first numbered question (e.g. \"1. ...\"). Do not include any text, explanation, reasoning or introduction before the first question. Anything that is not part of the numbered list of questions (and answer options where the format asks for them) will be ignored.
Follow every formatting instruction EXACTLY. Stick to the requested distribution of question types.
Produce ONLY the numbered list of questions. NO ANSWERS at this stage.";

/// System instruction sent alongside the answer key prompt.
pub const ANSWER_SYSTEM_INSTRUCTION: &str = "You are an assistant that adds CORRECT ANSWERS to a given list of study questions.
IMPORTANT: Your output MUST start directly with the first numbered question (e.g. \"1. ...\") from the student version, followed by its answer. Do not include any text, explanation, reasoning or introduction before the first question. Anything that is not part of the numbered list of questions and answers will be ignored.
Use the transcript (in its compacted form) as the only source for the answers. Follow the answer format for each question type.
Produce ONLY the complete teacher version (questions WITH answers).";

pub const TRANSCRIPT_START: &str = "--- START OF TRANSCRIPT ---";
pub const TRANSCRIPT_END: &str = "--- END OF TRANSCRIPT ---";
pub const QUESTIONS_START: &str = "--- START OF STUDENT VERSION ---";
pub const QUESTIONS_END: &str = "--- END OF STUDENT VERSION ---";

const PREVIEW_SEPARATOR: &str = "---- USER PROMPT (starts below) ----";

/// Join phrases as "a", "a and b" or "a, b, and c".
pub fn join_phrases(parts: &[String]) -> String {
    match parts {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

/// Build the user prompt asking for `total` questions about `transcript`.
/// Category specific rules are only included for categories with a non-zero
/// count.
pub fn build_question_prompt(
    total: u32,
    distribution: &str,
    mcq: u32,
    short_answer: u32,
    discussion: u32,
    transcript: &str,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    parts.push(format!(
        "Below is the transcript of a video. Write a list of exactly {total} well-phrased study questions that are 100% based on the content of the whole transcript, from beginning to end."
    ));
    parts.push(
        "\nIMPORTANT: Before you start writing questions you MUST read and analyse the ENTIRE transcript. Do NOT focus only on the beginning."
            .to_string(),
    );

    parts.push("\nGENERAL REQUIREMENTS (MUST BE FOLLOWED):".to_string());
    parts.push(format!(
        "1.  Distribute the question types EXACTLY like this: {distribution}."
    ));
    parts.push(
        "2.  Present ALL questions in a single numbered list (start with \"1. \", \"2. \", etc.)."
            .to_string(),
    );
    parts.push(
        "3.  EVERY question, regardless of type, MUST end with a timestamp in square brackets on the SAME LINE as the question text. The timestamp uses the format [mm:ss] (or [hh:mm:ss] for long videos) and MUST be the START time of the relevant transcript segment. NO QUESTION WITHOUT SUCH A TIMESTAMP ON THE SAME LINE."
            .to_string(),
    );
    parts.push(
        "4.  Separate each complete question (question plus any answer options) from the next one with ONE empty line."
            .to_string(),
    );
    parts.push(
        "5.  Your response MUST contain ONLY the numbered list of questions. NO ANSWERS, no introduction before question 1 and no comments or explanations after the last question. Start directly with \"1. ...\"."
            .to_string(),
    );

    if mcq > 0 {
        parts.push(format!(
            "\nREQUIREMENTS FOR MULTIPLE-CHOICE QUESTIONS (APPLY TO ALL {mcq}):"
        ));
        parts.push("-   Each multiple-choice question (which must carry a timestamp as in rule 3) is IMMEDIATELY followed by EXACTLY four (4) distinct options on new lines below the question.".to_string());
        parts.push("-   Label the options A., B., C., D. (or A) B) C) D)).".to_string());
        parts.push("-   One of the options is the correct answer and can be derived from the transcript.".to_string());
        parts.push("-   The other three options are plausible but wrong. Avoid obviously wrong or trivial options.".to_string());
        parts.push("-   Do NOT indicate which option is correct in this student version.".to_string());
    }
    if short_answer > 0 {
        parts.push(format!(
            "\nREQUIREMENTS FOR SHORT-ANSWER QUESTIONS (APPLY TO ALL {short_answer}):"
        ));
        parts.push("-   Phrase the question so that the answer is a brief text based on information, reasoning or statements taken directly from the transcript.".to_string());
        parts.push("-   The question MUST follow the general requirements (numbering, timestamp on the same line).".to_string());
    }
    if discussion > 0 {
        parts.push(format!(
            "\nREQUIREMENTS FOR DISCUSSION QUESTIONS (APPLY TO ALL {discussion}):"
        ));
        parts.push("-   The question invites reflection and/or analysis based on the content of the transcript.".to_string());
        parts.push("-   It may refer to, or encourage the use of, information from several different parts of the transcript.".to_string());
        parts.push("-   The question MUST follow the general requirements (numbering, timestamp on the same line).".to_string());
    }

    parts.push(
        "\nHere is the transcript (each segment starts with its time range [start] --> [end]):"
            .to_string(),
    );
    parts.push(TRANSCRIPT_START.to_string());
    parts.push(transcript.to_string());
    parts.push(TRANSCRIPT_END.to_string());
    parts.push("\nREMEMBER: Start your response directly with \"1. ...\". Follow the format requirements for timestamps and multiple-choice options carefully.".to_string());

    parts.join("\n")
}

/// Full text shown by the prompt preview: system instruction, separator, user prompt.
pub fn preview_text(user_prompt: &str) -> String {
    format!("{QUESTION_SYSTEM_INSTRUCTION}\n\n{PREVIEW_SEPARATOR}\n\n{user_prompt}")
}

/// Build the user prompt that turns a student version into a teacher version
/// with answers, using the same compacted transcript as reference.
pub fn build_answer_prompt(transcript: &str, student_questions: &str) -> String {
    format!(
        "Below is a list of study questions (student version) and the transcript (one time range [start] --> [end] per segment) they were based on.
Your task is to create a TEACHER VERSION by adding an answer to EVERY question.
Use ONLY the transcript to derive correct and relevant answers.
Keep exactly the same questions, numbering and timestamps [mm:ss] (or [hh:mm:ss]) as in the student version.

ANSWER FORMAT IN THE TEACHER VERSION:
1.  Multiple-choice questions (those with A, B, C, D options in the student version):
    Repeat the question and its options.
    On a new line directly below the options write:
    Correct answer: Letter. Full text of the correct option (e.g. \"Correct answer: B. The option text\")
2.  Short-answer questions (those WITHOUT A, B, C, D options):
    Repeat the question.
    On a new line directly below the question write:
    Answer: A short, concise answer based on the transcript.
3.  Discussion questions (those WITHOUT options that are more open ended):
    Repeat the question.
    On a new line directly below the question write:
    Suggested answer: A developed answer or discussion points based on the transcript. Several sentences are welcome.

GENERAL FORMAT OF THE TEACHER VERSION:
-   Start directly with question 1, its options if any, and then its answer.
-   Separate each complete question (question + [options] + answer) from the next one with ONE empty line.
-   IMPORTANT: Do NOT add any extra headings, sections or similar.

Transcript:
{TRANSCRIPT_START}
{transcript}
{TRANSCRIPT_END}

Student version to complete with answers:
{QUESTIONS_START}
{student_questions}
{QUESTIONS_END}

REMINDER: Produce ONLY the numbered list of questions and answers in the format above. Start directly with \"1. ...\". No extra text is allowed."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSCRIPT: &str = "[00:01] --> [00:04]\nwelcome to the lecture";

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("missing {needle:?}"))
    }

    #[test]
    fn joins_phrases_oxford_style() {
        let p = |v: &[&str]| join_phrases(&v.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        assert_eq!(p(&[]), "");
        assert_eq!(p(&["a"]), "a");
        assert_eq!(p(&["a", "b"]), "a and b");
        assert_eq!(p(&["a", "b", "c"]), "a, b, and c");
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let prompt = build_question_prompt(3, "1 x, 1 y, and 1 z", 1, 1, 1, TRANSCRIPT);
        let order = [
            "exactly 3 well-phrased",
            "read and analyse the ENTIRE transcript",
            "1.  Distribute the question types EXACTLY like this: 1 x, 1 y, and 1 z.",
            "START time of the relevant transcript segment",
            "MULTIPLE-CHOICE QUESTIONS (APPLY TO ALL 1)",
            "SHORT-ANSWER QUESTIONS (APPLY TO ALL 1)",
            "DISCUSSION QUESTIONS (APPLY TO ALL 1)",
            TRANSCRIPT_START,
            TRANSCRIPT,
            TRANSCRIPT_END,
            "REMEMBER: Start your response directly with \"1. ...\"",
        ];
        let positions: Vec<usize> = order.iter().map(|n| position(&prompt, n)).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    }

    #[test]
    fn omits_rules_for_empty_categories() {
        let prompt = build_question_prompt(2, "2 short-answer questions", 0, 2, 0, TRANSCRIPT);
        assert!(prompt.contains("SHORT-ANSWER QUESTIONS (APPLY TO ALL 2)"));
        assert!(!prompt.contains("MULTIPLE-CHOICE QUESTIONS"));
        assert!(!prompt.contains("DISCUSSION QUESTIONS"));
    }

    #[test]
    fn is_deterministic() {
        let a = build_question_prompt(4, "d", 2, 1, 1, TRANSCRIPT);
        let b = build_question_prompt(4, "d", 2, 1, 1, TRANSCRIPT);
        assert_eq!(a, b);
    }

    #[test]
    fn preview_starts_with_system_instruction() {
        let preview = preview_text("USER");
        assert!(preview.starts_with(QUESTION_SYSTEM_INSTRUCTION));
        assert!(preview.ends_with("\n\nUSER"));
    }

    #[test]
    fn answer_prompt_embeds_transcript_and_questions() {
        let prompt = build_answer_prompt(TRANSCRIPT, "1. Why? [00:01]");
        assert!(position(&prompt, TRANSCRIPT_START) < position(&prompt, TRANSCRIPT));
        assert!(position(&prompt, QUESTIONS_START) < position(&prompt, "1. Why? [00:01]"));
        assert!(position(&prompt, "1. Why? [00:01]") < position(&prompt, QUESTIONS_END));
    }
}
