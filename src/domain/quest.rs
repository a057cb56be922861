/// Quest flags and conditional dialogue.
///
/// Condition forms:
///   `flag:<key>`   the flag is set
///   `item:<name>`  the player owns the item (`sword`)
/// A leading `!` negates either form (`!flag:met_oldman`). NPCs carry an
/// ordered list of `(condition, lines)` options; the first one that holds
/// wins, otherwise their default lines are spoken.

use super::entity::Inventory;

/// Set when the sword is picked up.
pub const FLAG_GOT_SWORD: &str = "got_sword";

/// Flag set after talking to the NPC with this id.
pub fn met_flag(npc_id: &str) -> String {
    format!("met_{npc_id}")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Owned {
    Sword,
}

impl Owned {
    fn from_name(name: &str) -> Option<Owned> {
        match name.to_ascii_lowercase().as_str() {
            "sword" => Some(Owned::Sword),
            _ => None,
        }
    }

    fn held_in(&self, inv: &Inventory) -> bool {
        match self {
            Owned::Sword => inv.sword_level > 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Test {
    Flag(String),
    Item(Owned),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Condition {
    pub negate: bool,
    pub test: Test,
}

impl Condition {
    /// `None` for an unknown form, an empty flag key or an unknown item.
    pub fn parse(text: &str) -> Option<Condition> {
        let text = text.trim();
        let (negate, body) = match text.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let test = if let Some(key) = body.strip_prefix("flag:") {
            if key.is_empty() {
                return None;
            }
            Test::Flag(key.to_string())
        } else if let Some(name) = body.strip_prefix("item:") {
            Test::Item(Owned::from_name(name)?)
        } else {
            return None;
        };
        Some(Condition { negate, test })
    }

    pub fn holds(&self, has_flag: impl Fn(&str) -> bool, inv: &Inventory) -> bool {
        let result = match &self.test {
            Test::Flag(key) => has_flag(key.as_str()),
            Test::Item(item) => item.held_in(inv),
        };
        result != self.negate
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DialogueOption {
    pub condition: Condition,
    pub lines: Vec<String>,
}

/// Lines of the first option whose condition holds, else `default`.
pub fn pick_dialogue<'a>(
    options: &'a [DialogueOption],
    default: &'a [String],
    has_flag: impl Fn(&str) -> bool,
    inv: &Inventory,
) -> &'a [String] {
    options
        .iter()
        .find(|o| o.condition.holds(&has_flag, inv))
        .map_or(default, |o| o.lines.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(set: &'static [&'static str]) -> impl Fn(&str) -> bool {
        move |k: &str| set.iter().any(|s| *s == k)
    }

    fn option(cond: &str, line: &str) -> DialogueOption {
        DialogueOption { condition: Condition::parse(cond).unwrap(), lines: vec![line.to_string()] }
    }

    #[test]
    fn parses_every_form() {
        assert_eq!(
            Condition::parse("flag:met_sage"),
            Some(Condition { negate: false, test: Test::Flag("met_sage".into()) })
        );
        assert_eq!(
            Condition::parse("!flag:met_sage"),
            Some(Condition { negate: true, test: Test::Flag("met_sage".into()) })
        );
        assert_eq!(Condition::parse("item:sword"), Some(Condition { negate: false, test: Test::Item(Owned::Sword) }));
        assert!(Condition::parse("!item:Sword").is_some_and(|c| c.negate));
    }

    #[test]
    fn rejects_unknown_forms() {
        assert_eq!(Condition::parse("flag:"), None);
        assert_eq!(Condition::parse("item:bow"), None);
        assert_eq!(Condition::parse("dungeon:1"), None);
        assert_eq!(Condition::parse(""), None);
    }

    #[test]
    fn flag_and_negation() {
        let inv = Inventory::default();
        let met = Condition::parse("flag:met_sage").unwrap();
        let not_met = Condition::parse("!flag:met_sage").unwrap();
        assert!(!met.holds(flags(&[]), &inv));
        assert!(not_met.holds(flags(&[]), &inv));
        assert!(met.holds(flags(&["met_sage"]), &inv));
        assert!(!not_met.holds(flags(&["met_sage"]), &inv));
    }

    #[test]
    fn item_checks_inventory() {
        let mut inv = Inventory::default();
        let has_sword = Condition::parse("item:sword").unwrap();
        assert!(!has_sword.holds(flags(&[]), &inv));
        inv.sword_level = 1;
        assert!(has_sword.holds(flags(&[]), &inv));
        assert!(!Condition::parse("!item:sword").unwrap().holds(flags(&[]), &inv));
    }

    #[test]
    fn first_matching_option_wins() {
        let inv = Inventory::default();
        let default = vec!["Hello.".to_string()];
        let options = vec![option("flag:got_sword", "Use it well."), option("flag:met_sage", "Back again?")];

        assert_eq!(pick_dialogue(&options, &default, flags(&[]), &inv).to_vec(), default);
        assert_eq!(pick_dialogue(&options, &default, flags(&["met_sage"]), &inv).to_vec(), vec!["Back again?".to_string()]);
        assert_eq!(
            pick_dialogue(&options, &default, flags(&["met_sage", "got_sword"]), &inv).to_vec(),
            vec!["Use it well.".to_string()]
        );
    }

    #[test]
    fn met_flag_is_keyed_by_id() {
        assert_eq!(met_flag("oldman"), "met_oldman");
    }
}
