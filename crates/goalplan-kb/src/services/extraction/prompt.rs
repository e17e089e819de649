//! Goal extraction prompt

/// Instructions sent ahead of the user's text. The model either answers with a
/// `{"goals": [...]}` object or replies in plain prose.
const PROMPT_PREAMBLE: &str = r#"You are a goal planning assistant. Your task is to analyze the provided text. If the text describes goals, tasks, or plans, extract them into a JSON object. Each goal should have a 'name' (string), 'description' (string), 'priority' (string, e.g., 'High', 'Medium', 'Low'), and an optional 'depends_on' (list of strings, names of goals this goal depends on). If the text is a general question or statement not related to defining goals, respond conversationally in plain text.

Example JSON structure for goals:
{"goals": [
    {"name": "Learn Python", "description": "Master Python programming", "priority": "High", "depends_on": []},
    {"name": "Build Web App", "description": "Develop a full-stack web application", "priority": "Medium", "depends_on": ["Learn Python"]}
]}

Text to analyze: "#;

pub fn build_prompt(text: &str) -> String {
    let mut prompt = String::with_capacity(PROMPT_PREAMBLE.len() + text.len() + 1);
    prompt.push_str(PROMPT_PREAMBLE);
    prompt.push_str(text);
    prompt.push('\n');
    prompt
}
