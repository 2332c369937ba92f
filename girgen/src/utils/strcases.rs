//! Casing heuristics used when renaming GIR types.

/// Decides how a getter marker is prefixed onto a name.
///
/// Naming conventions differ per target language, so the choice is left
/// pluggable; [`SnakeGuess`] is the default.
pub trait GetterStyle {
    fn getter_name(&self, name: &str) -> String;
}

/// `get_` for names that look snake_case, `Get` for everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeGuess;

impl GetterStyle for SnakeGuess {
    fn getter_name(&self, name: &str) -> String {
        if guess_snake(name) {
            format!("get_{name}")
        } else {
            format!("Get{name}")
        }
    }
}

impl<F> GetterStyle for F
where
    F: Fn(&str) -> String,
{
    fn getter_name(&self, name: &str) -> String {
        self(name)
    }
}

/// Whether `name` is probably snake_case: it has an underscore or no
/// uppercase letter at all.
pub fn guess_snake(name: &str) -> bool {
    name.contains('_') || !name.chars().any(char::is_uppercase)
}
