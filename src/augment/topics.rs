use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub title: &'static str,
    pub url: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Topic {
    pub category: &'static str,
    pub keywords: &'static [&'static str],
    pub articles: &'static [Article],
}

impl Topic {
    /// `text` must already be lower-cased
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|keyword| text.contains(keyword))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestedQuestions {
    pub category: &'static str,
    pub questions: &'static [&'static str],
}

pub static TOPICS: &[Topic] = &[
    Topic {
        category: "baby care",
        keywords: &["baby", "newborn", "sleep", "tummy time", "belly button"],
        articles: &[
            Article {
                title: "Baby Belly Button Care",
                url: "https://example.com/belly-button-care",
                description: "Keeping the umbilical stump clean and dry until it falls off.",
            },
            Article {
                title: "Newborn Sleep Routine",
                url: "https://example.com/sleep-routine",
                description: "Building a calm bedtime routine in the first months.",
            },
            Article {
                title: "When to Start Tummy Time",
                url: "https://example.com/tummy-time",
                description: "Short supervised sessions from the first days home.",
            },
        ],
    },
    Topic {
        category: "postpartum",
        keywords: &["postpartum", "c-section", "breastfeeding", "depression"],
        articles: &[
            Article {
                title: "C-Section Recovery Guide",
                url: "https://example.com/c-section-recovery",
                description: "Wound care, rest, and what to expect week by week.",
            },
            Article {
                title: "Managing Postpartum Depression",
                url: "https://example.com/postpartum-depression",
                description: "Recognising the signs and where to find support.",
            },
            Article {
                title: "Breastfeeding Tips",
                url: "https://example.com/breastfeeding-tips",
                description: "Latching, feeding positions, and milk supply basics.",
            },
        ],
    },
    Topic {
        category: "pregnancy",
        keywords: &["pregnancy", "stretch marks", "vitamins", "trimester"],
        articles: &[
            Article {
                title: "Stretch Marks Prevention",
                url: "https://example.com/stretch-marks",
                description: "Hydration, moisturising, and gradual weight gain.",
            },
            Article {
                title: "Essential Vitamins During Pregnancy",
                url: "https://example.com/pregnancy-vitamins",
                description: "Folic acid, iron, calcium, and vitamin D.",
            },
            Article {
                title: "What to Expect Each Trimester",
                url: "https://example.com/pregnancy-trimesters",
                description: "Milestones and checkups from conception to delivery.",
            },
        ],
    },
];

pub static SUGGESTED_QUESTIONS: &[SuggestedQuestions] = &[
    SuggestedQuestions {
        category: "👶 Baby Care",
        questions: &[
            "When does the belly button fall off?",
            "When should my baby start doing tummy time?",
            "How do I establish a sleep routine for my newborn?",
            "When is it recommended to introduce solid foods?",
        ],
    },
    SuggestedQuestions {
        category: "🤱 Postpartum Recovery",
        questions: &[
            "How can I care for my C-section wound?",
            "What should I expect during postpartum recovery?",
        ],
    },
    SuggestedQuestions {
        category: "🤰 Pregnancy",
        questions: &[
            "How to avoid stretch marks during my pregnancy?",
            "What are the essential vitamins and nutrients I should take?",
        ],
    },
];

pub static SYMPTOM_KEYWORDS: &[&str] = &[
    "fever", "sick", "infection", "pain", "rash", "vomiting", "diarrhea",
];

pub const MEDICAL_DISCLAIMER: &str = "⚠️ **Please note:** I'm not a doctor. If you or your baby have symptoms like these, please contact your doctor, midwife, or pediatrician, or seek medical attention right away.";

pub const RELATED_ARTICLES_HEADING: &str = "**📚 Related articles:**";
