use crate::modality::Modality;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Which lexical category a match came from. Keywords and adjectives carry
/// more sensory weight than verbs when estimating intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexemeClass {
    Keyword,
    Verb,
    Adjective,
    IntensityMarker,
}

impl LexemeClass {
    /// Base intensity contributed by a lexeme of this class, absent any
    /// nearby intensity marker.
    #[must_use]
    pub const fn base_intensity(self) -> f32 {
        match self {
            LexemeClass::Keyword => 0.5,
            LexemeClass::Verb => 0.4,
            LexemeClass::Adjective => 0.6,
            LexemeClass::IntensityMarker => 0.5,
        }
    }
}

/// Lexicon block for a single modality.
#[derive(Debug)]
pub struct ModalityLexicon {
    pub keywords: &'static [&'static str],
    pub verbs: &'static [&'static str],
    pub adjectives: &'static [&'static str],
    pub intensity_markers: &'static [&'static str],
}

impl ModalityLexicon {
    /// Look up a normalized lemma in this block.
    #[must_use]
    pub fn classify(&self, lemma: &str) -> Option<LexemeClass> {
        if self.keywords.contains(&lemma) {
            Some(LexemeClass::Keyword)
        } else if self.adjectives.contains(&lemma) {
            Some(LexemeClass::Adjective)
        } else if self.verbs.contains(&lemma) {
            Some(LexemeClass::Verb)
        } else if self.intensity_markers.contains(&lemma) {
            Some(LexemeClass::IntensityMarker)
        } else {
            None
        }
    }
}

static LEXICON: Lazy<BTreeMap<Modality, ModalityLexicon>> = Lazy::new(|| {
    let mut map = BTreeMap::new();
    map.insert(
        Modality::Visual,
        ModalityLexicon {
            keywords: &[
                "sight", "eye", "light", "dark", "color", "colour", "glare", "glow", "shadow",
                "shine", "sparkle", "glitter",
            ],
            verbs: &["see", "look", "gaze", "glimpse", "observe", "glisten", "shimmer", "gleam"],
            adjectives: &[
                "bright", "dim", "vivid", "visible", "blinding", "dazzling", "pale", "vibrant",
                "glistening", "sparkling", "shimmering", "radiant",
            ],
            intensity_markers: &["faint", "strong", "intense", "blinding"],
        },
    );
    map.insert(
        Modality::Auditory,
        ModalityLexicon {
            keywords: &[
                "sound", "noise", "tone", "voice", "silence", "ring", "buzz", "echo", "whisper",
                "shout", "scream", "bell", "melody", "hum",
            ],
            verbs: &["hear", "listen", "ring", "buzz", "chime", "roar"],
            adjectives: &["loud", "quiet", "deafening", "muted", "resonant", "shrill"],
            intensity_markers: &["soft", "loud", "deafening", "piercing"],
        },
    );
    map.insert(
        Modality::Tactile,
        ModalityLexicon {
            keywords: &["touch", "texture", "grain", "warmth", "chill", "pressure", "embrace"],
            verbs: &["feel", "brush", "graze", "stroke", "press"],
            adjectives: &[
                "soft", "rough", "coarse", "silky", "sticky", "smooth", "warm", "cold", "velvety",
            ],
            intensity_markers: &["light", "gentle", "firm", "forceful"],
        },
    );
    map.insert(
        Modality::Olfactory,
        ModalityLexicon {
            keywords: &["smell", "scent", "odor", "aroma", "fragrance", "reek", "perfume"],
            verbs: &["sniff", "inhale", "waft"],
            adjectives: &["fragrant", "pungent", "musty", "acrid", "smoky"],
            intensity_markers: &["faint", "noticeable", "strong", "overpowering"],
        },
    );
    map.insert(
        Modality::Gustatory,
        ModalityLexicon {
            keywords: &["taste", "flavor", "flavour", "tang", "aftertaste"],
            verbs: &["savor", "sip", "chew", "swallow"],
            adjectives: &["sweet", "salty", "bitter", "sour", "savory", "spicy", "tart"],
            intensity_markers: &["mild", "tangy", "strong", "overpowering"],
        },
    );
    map.insert(
        Modality::Kinesthetic,
        ModalityLexicon {
            keywords: &["motion", "balance", "spin", "sway", "rush", "plunge", "drift"],
            verbs: &["spin", "soar", "race", "tumble", "glide", "lurch", "float"],
            adjectives: &["dizzy", "weightless", "breathless", "reeling", "unsteady"],
            intensity_markers: &["slow", "sudden", "violent", "headlong"],
        },
    );
    map
});

/// Phrase-level expression with an implied modality. Matched before
/// token-level lookups so the idiom wins over its constituent words.
#[derive(Debug, Clone, Copy)]
pub struct Idiom {
    pub phrase: &'static str,
    pub modality: Modality,
    pub intensity: f32,
}

static IDIOMS: &[Idiom] = &[
    Idiom {
        phrase: "as clear as day",
        modality: Modality::Visual,
        intensity: 0.6,
    },
    Idiom {
        phrase: "music to my ears",
        modality: Modality::Auditory,
        intensity: 0.6,
    },
    Idiom {
        phrase: "a slap in the face",
        modality: Modality::Tactile,
        intensity: 0.8,
    },
    Idiom {
        phrase: "smells fishy",
        modality: Modality::Olfactory,
        intensity: 0.5,
    },
    Idiom {
        phrase: "left a bitter taste",
        modality: Modality::Gustatory,
        intensity: 0.6,
    },
    Idiom {
        phrase: "head over heels",
        modality: Modality::Kinesthetic,
        intensity: 0.7,
    },
];

#[must_use]
pub fn idioms() -> &'static [Idiom] {
    IDIOMS
}

#[must_use]
pub fn modality_lexicon(modality: Modality) -> &'static ModalityLexicon {
    &LEXICON[&modality]
}

/// Resolve the dominant modality for a normalized lemma.
///
/// A lemma appearing under several modalities resolves to the one with the
/// highest base weight; remaining ties go to enum order, so the result is
/// stable across runs.
#[must_use]
pub fn keyword_modality(lemma: &str) -> Option<(Modality, LexemeClass)> {
    let mut best: Option<(Modality, LexemeClass)> = None;
    for (&modality, block) in LEXICON.iter() {
        if let Some(class) = block.classify(lemma) {
            let better = match best {
                Some((current, _)) => modality.base_weight() > current.base_weight(),
                None => true,
            };
            if better {
                best = Some((modality, class));
            }
        }
    }
    best
}

/// Map an intensity-marker token to a numeric score, if it is one.
#[must_use]
pub fn intensity_score(lemma: &str) -> Option<f32> {
    const LOW: &[&str] = &["faint", "mild", "slightly", "light", "soft", "slow", "gentle"];
    const MEDIUM: &[&str] = &["noticeable", "moderate", "somewhat"];
    const HIGH: &[&str] = &[
        "strong", "intense", "very", "piercing", "blinding", "loud", "firm", "sudden",
    ];
    const VERY_HIGH: &[&str] = &[
        "overpowering", "deafening", "explosive", "violent", "forceful", "headlong",
    ];

    if LOW.contains(&lemma) {
        Some(0.2)
    } else if MEDIUM.contains(&lemma) {
        Some(0.5)
    } else if HIGH.contains(&lemma) {
        Some(0.8)
    } else if VERY_HIGH.contains(&lemma) {
        Some(1.0)
    } else {
        None
    }
}
