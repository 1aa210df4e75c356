use crate::profile::SkinProfile;

fn format_rules() -> &'static str {
r#"Formatting:
- Start the morning routine with "Morning:" and the night routine with "Night:".
- Number the steps of each routine.
- Keep each recipe to a short ingredient list followed by one line of directions.
- Plain text only; no tables."#
}

/// Instruction sent to chat backends. Total and deterministic.
pub fn build_prompt(profile: &SkinProfile) -> String {
    format!(
"I have {skin_type} skin and my skincare goal is {goal}.
Please suggest:
1. A simple morning skincare routine.
2. A simple night skincare routine.
3. Two DIY skincare recipes using these home ingredients: {ingredients}.

{rules}",
        skin_type = profile.skin_type,
        goal = profile.goal,
        ingredients = profile.ingredients_or_none(),
        rules = format_rules(),
    )
}

/// Completion-style seed for the local decoder, which continues text rather
/// than following instructions.
pub fn build_completion_seed(profile: &SkinProfile) -> String {
    format!(
"Skin Type: {skin_type}
Goal: {goal}
Ingredients: {ingredients}

Morning Routine:",
        skin_type = profile.skin_type,
        goal = profile.goal,
        ingredients = profile.ingredients_or_none(),
    )
}
