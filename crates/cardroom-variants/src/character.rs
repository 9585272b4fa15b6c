//! Character modifiers ("detrimental characters").
//!
//! Purely descriptive data: the legality engine enforces what each one
//! means. The server only needs to hand them out and describe them.

/// One character modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Character {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
    /// Meaningless with two players (e.g. "the player to their left").
    pub not_2p: bool,
}

const fn character(
    id: u32,
    name: &'static str,
    description: &'static str,
    emoji: &'static str,
) -> Character {
    Character {
        id,
        name,
        description,
        emoji,
        not_2p: false,
    }
}

const fn not_2p(c: Character) -> Character {
    Character { not_2p: true, ..c }
}

static CHARACTERS: [Character; 31] = [
    // Clue restrictions (giving)
    character(0, "Fuming", "Can only clue numbers and [random color]", "🌋"),
    character(1, "Dumbfounded", "Can only clue colors and [random number]", "🤯"),
    character(2, "Inept", "Cannot give any clues that touch [random color] cards", "🤔"),
    character(3, "Awkward", "Cannot give any clues that touch [random number]s", "😬"),
    character(4, "Conservative", "Can only give clues that touch a single card", "🕇"),
    character(5, "Greedy", "Can only give clues that touch 2+ cards", "🤑"),
    character(6, "Picky", "Can only clue odd numbers or odd colors", "🤢"),
    not_2p(character(7, "Spiteful", "Cannot clue the player to their left", "😈")),
    not_2p(character(8, "Insolent", "Cannot clue the player to their right", "😏")),
    character(9, "Vindictive", "Must clue if they received a clue since their last turn", "🗡️"),
    character(10, "Miser", "Can only clue if there are 4 or more clues available", "💰"),
    character(
        11,
        "Compulsive",
        "Can only clue if it touches the newest or oldest card in someone's hand",
        "📺",
    ),
    character(12, "Mood Swings", "Clues given must alternate between color and number", "👧"),
    character(
        13,
        "Insistent",
        "Must continue to clue cards until one of them is played or discarded",
        "😣",
    ),
    // Clue restrictions (receiving)
    character(14, "Vulnerable", "Cannot receive a number 2 or number 5 clue", "🛡️"),
    character(15, "Color-Blind", "Cannot receive a color clue", "👓"),
    // Play restrictions
    character(
        67,
        "Follower",
        "Cannot play a card unless two cards of the same rank have already been played",
        "👁️",
    ),
    character(17, "Impulsive", "Must play slot 1 if it has been clued", "💉"),
    character(18, "Indolent", "Cannot play a card if they played on the last round", "💺"),
    character(19, "Hesitant", "Cannot play cards from slot 1", "👴🏻"),
    // Discard restrictions
    character(
        21,
        "Anxious",
        "Cannot discard if there is an even number of clues available (including 0)",
        "😰",
    ),
    character(22, "Traumatized", "Cannot discard if there is an odd number of clues available", "😨"),
    character(23, "Wasteful", "Cannot discard if there are 2 or more clues available", "🗑️"),
    // Extra turns
    character(24, "Genius", "Must clue both a number and a color (uses 2 clues)", "🧠"),
    character(
        25,
        "Synesthetic",
        "Must clue both a number and a color of the same value (uses 1 clue)",
        "🎨",
    ),
    character(26, "Panicky", "When discarding, discards twice if 4 clues or less", "😳"),
    // Other
    not_2p(character(27, "Contrarian", "Play order inverts after taking a turn, 2-turn end game", "🙅")),
    character(
        28,
        "Stubborn",
        "Must perform a different action type than the player that came before them",
        "😠",
    ),
    not_2p(character(29, "Blind Spot", "Cannot see the cards of the player to their left", "🚗")),
    not_2p(character(30, "Oblivious", "Cannot see the cards of the player to their right", "🚂")),
    character(31, "Forgetful", "Hand is shuffled after discarding (but before drawing)", "🔀"),
];

/// Every character, in catalog order.
pub fn characters() -> &'static [Character] {
    &CHARACTERS
}

/// Looks up a character by ID.
pub fn character_by_id(id: u32) -> Option<&'static Character> {
    CHARACTERS.iter().find(|c| c.id == id)
}

/// Characters that make sense at a table of `player_count` players.
pub fn eligible_characters(player_count: usize) -> impl Iterator<Item = &'static Character> {
    CHARACTERS
        .iter()
        .filter(move |c| player_count > 2 || !c.not_2p)
}
