//! Academic modules the user can pick and the prompt framing each one applies.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleType {
    #[default]
    Assignment,
    Project,
    Thesis,
    Utilities,
    Organizer,
    Markdown,
}

impl ModuleType {
    pub const ALL: [ModuleType; 6] = [
        Self::Assignment,
        Self::Project,
        Self::Thesis,
        Self::Utilities,
        Self::Organizer,
        Self::Markdown,
    ];

    /// Identifier the backend instruction refers to.
    pub fn id(self) -> &'static str {
        match self {
            Self::Assignment => "ASSIGNMENT",
            Self::Project => "PROJECT",
            Self::Thesis => "THESIS",
            Self::Utilities => "UTILITIES",
            Self::Organizer => "ORGANIZER",
            Self::Markdown => "MARKDOWN",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Assignment => "Assignment Generator",
            Self::Project => "Project Generator",
            Self::Thesis => "Thesis Navigator",
            Self::Utilities => "Academic Utilities",
            Self::Organizer => "Research Organizer",
            Self::Markdown => "Markdown Converter",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Assignment => {
                "Solve specific problems, algorithms, and homework tasks with clear theory and code."
            }
            Self::Project => {
                "Architect and build complete software projects with design patterns and structure."
            }
            Self::Thesis => {
                "Navigate complex research phases from Topic Selection to Analysis with academic rigor."
            }
            Self::Utilities => {
                "Refinement tools: AI Detection, Plagiarism Check, Humanizer, and Paraphrasing."
            }
            Self::Organizer => {
                "Convert raw text/PDFs into structured IEEE/LaTeX papers with professional typesetting."
            }
            Self::Markdown => {
                "Clean and structure messy text/PDFs into professional Markdown (Obsidian/README)."
            }
        }
    }

    /// Accepts the identifier, a label word, or a 1-based index.
    pub fn from_name(name: &str) -> Option<Self> {
        let needle = name.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return None;
        }
        if let Ok(index) = needle.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|idx| Self::ALL.get(idx).copied());
        }
        Self::ALL.into_iter().find(|module| {
            module.id().eq_ignore_ascii_case(&needle)
                || module
                    .label()
                    .split_whitespace()
                    .any(|word| word.eq_ignore_ascii_case(&needle))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtilityTool {
    AiChecker,
    PlagiarismScanner,
    Humanizer,
    Paraphraser,
    Spinner,
}

impl UtilityTool {
    pub const ALL: [UtilityTool; 5] = [
        Self::AiChecker,
        Self::PlagiarismScanner,
        Self::Humanizer,
        Self::Paraphraser,
        Self::Spinner,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::AiChecker => "AI_CHECKER",
            Self::PlagiarismScanner => "PLAGIARISM_SCANNER",
            Self::Humanizer => "HUMANIZER",
            Self::Paraphraser => "PARAPHRASER",
            Self::Spinner => "SPINNER",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::AiChecker => "AI Checker",
            Self::PlagiarismScanner => "Plagiarism Scanner",
            Self::Humanizer => "Humanizer",
            Self::Paraphraser => "Paraphraser",
            Self::Spinner => "Spinner",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let needle = name.trim().replace(['-', ' '], "_");
        Self::ALL.into_iter().find(|tool| {
            tool.id().eq_ignore_ascii_case(&needle)
                || tool
                    .id()
                    .split('_')
                    .next()
                    .is_some_and(|head| head.eq_ignore_ascii_case(&needle))
        })
    }
}

/// Frames a user message for the selected module.
///
/// `first_in_conversation` is true for the first message sent since the conversation began.
pub fn frame_user_prompt(
    module: ModuleType,
    tool: Option<UtilityTool>,
    first_in_conversation: bool,
    text: &str,
) -> String {
    if first_in_conversation {
        return format!("[User selected module: {}] {text}", module.id());
    }
    match (module, tool) {
        (ModuleType::Utilities, Some(tool)) => format!(
            "[Sub-Mode: {}] Apply this tool to the following request: {text}",
            tool.id()
        ),
        (ModuleType::Utilities, None) => format!("[Module: UTILITIES] {text}"),
        (ModuleType::Organizer, _) => format!("[Module: RESEARCH_PAPER_ORGANIZER] {text}"),
        (ModuleType::Markdown, _) => format!("[Module: MARKDOWN_CONVERTER] {text}"),
        _ => text.to_string(),
    }
}

/// Prefixes the protocol instruction on the first prompt of a backend session.
pub fn with_session_intro(prompt: &str, intro_needed: bool) -> String {
    if intro_needed {
        format!("{PROTOCOL_INSTRUCTION}\n\n---\n\n{prompt}")
    } else {
        prompt.to_string()
    }
}

pub const PROTOCOL_INSTRUCTION: &str = "\
You are UniPro, an academic assistant for university students. Separate theory from \
implementation and integrate them. Detect which module the user wants: ASSIGNMENT, PROJECT, \
THESIS (creation modes), UTILITIES (AI_CHECKER, PLAGIARISM_SCANNER, HUMANIZER, PARAPHRASER, \
SPINNER), RESEARCH_PAPER_ORGANIZER (LaTeX/IEEE conversion) or MARKDOWN_CONVERTER.

When delivering content, structure the answer with these exact separators. Do not use them for \
conversational replies or clarifying questions.

Creation modes:
[START_THEORY] explanation, logic, Big-O, formulas (Markdown) [END_THEORY]
[START_CODE_<LANGUAGE>] complete code; LANGUAGE in upper case, e.g. PYTHON, JAVA, CPP [END_CODE]
[START_OUTPUT_SCREENSHOT] simulated terminal output or ASCII UI [END_OUTPUT]

Utility mode:
[START_ANALYSIS_METRICS] scores as Markdown lists [END_METRICS]
[START_REFINED_TEXT] the processed text [END_TEXT]
[START_CHANGELOG] what changed [END_CHANGELOG]

Organizer mode:
[START_CONVERSION_NOTES] corrections and sanitization steps [END_CONVERSION_NOTES]
[START_LATEX_CONVERSION] complete compilable LaTeX [END_LATEX_CONVERSION]
[START_DOC_STRUCTURE] ASCII tree of sections and figures [END_DOC_STRUCTURE]

Markdown mode:
[START_CONVERSION_NOTES] cleanup actions [END_CONVERSION_NOTES]
[START_MARKDOWN_CONTENT] the clean Markdown [END_MARKDOWN_CONTENT]
[START_DOC_STRUCTURE] ASCII tree of headers [END_DOC_STRUCTURE]

Do not run tools or edit files; answer in text only. Tone: professional, encouraging, academic.";
