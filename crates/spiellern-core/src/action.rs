//! Aktionskatalog des Agenten.
//!
//! Jede Aktion ist ein Index in den Ausgabevektor des Modells; der Katalog
//! liefert Name und Kategorie. Die eigentliche Tastatur-/Maus-Ausführung
//! übernimmt eine externe Eingabeschicht.

use serde::{Deserialize, Serialize};

/// Kategorie einer Aktion; Gewichtstabellen arbeiten auf dieser Ebene statt
/// auf einzelnen Indizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Movement,
    Skill,
    Special,
    Mouse,
    Combo,
}

/// Ein Eintrag des Aktionskatalogs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub index: usize,
    pub name: String,
    pub kind: ActionKind,
}

/// Geordneter Katalog aller Aktionen des Agenten.
#[derive(Debug, Clone)]
pub struct ActionCatalog {
    actions: Vec<ActionSpec>,
}

impl ActionCatalog {
    /// Index der Leerlauf-Aktion im Standardkatalog.
    pub const NOOP_ACTION: usize = 8;
    /// Index der Ausweich-Aktion im Standardkatalog (Notfallaktion).
    pub const DODGE_ACTION: usize = 19;

    #[must_use]
    pub fn new(actions: Vec<ActionSpec>) -> Self {
        Self { actions }
    }

    /// Standardkatalog mit 32 Aktionen: Bewegung (0–8, 8 = Leerlauf),
    /// Fertigkeiten (9–18), Sonderaktionen (19–21), Maus (22–24),
    /// Kombinationen (25–31).
    #[must_use]
    pub fn standard() -> Self {
        fn spec(index: usize, name: &str, kind: ActionKind) -> ActionSpec {
            ActionSpec {
                index,
                name: name.to_string(),
                kind,
            }
        }

        use ActionKind::*;
        Self::new(vec![
            spec(0, "move forward", Movement),
            spec(1, "move back", Movement),
            spec(2, "strafe left", Movement),
            spec(3, "strafe right", Movement),
            spec(4, "forward-left", Movement),
            spec(5, "forward-right", Movement),
            spec(6, "back-left", Movement),
            spec(7, "back-right", Movement),
            spec(8, "no-op", Movement),
            spec(9, "skill 1", Skill),
            spec(10, "skill 2", Skill),
            spec(11, "skill 3", Skill),
            spec(12, "skill 4", Skill),
            spec(13, "skill 5", Skill),
            spec(14, "skill 6", Skill),
            spec(15, "skill q", Skill),
            spec(16, "skill e", Skill),
            spec(17, "skill r", Skill),
            spec(18, "skill f", Skill),
            spec(19, "dodge", Special),
            spec(20, "switch target", Special),
            spec(21, "interact", Special),
            spec(22, "mouse left", Mouse),
            spec(23, "mouse right", Mouse),
            spec(24, "mouse middle", Mouse),
            spec(25, "shift skill 1", Combo),
            spec(26, "shift skill 2", Combo),
            spec(27, "shift skill q", Combo),
            spec(28, "shift skill e", Combo),
            spec(29, "ctrl skill 1", Combo),
            spec(30, "ctrl skill 2", Combo),
            spec(31, "ctrl skill q", Combo),
        ])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ActionSpec> {
        self.actions.get(index)
    }

    /// Name der Aktion; unbekannte Indizes erhalten einen Platzhalternamen.
    #[must_use]
    pub fn name(&self, index: usize) -> String {
        self.actions
            .get(index)
            .map_or_else(|| format!("action {index}"), |a| a.name.clone())
    }

    #[must_use]
    pub fn kind(&self, index: usize) -> Option<ActionKind> {
        self.actions.get(index).map(|a| a.kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionSpec> {
        self.actions.iter()
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
