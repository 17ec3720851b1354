use std::collections::HashSet;

use crate::augment::topics::{
    Article, MEDICAL_DISCLAIMER, RELATED_ARTICLES_HEADING, SYMPTOM_KEYWORDS, TOPICS, Topic,
};

pub mod topics;

/// Appends a medical disclaimer and related reading to a generated reply,
/// based on what the user asked.
///
/// Matching is a case-insensitive substring test. Every matching category
/// contributes, in table order; articles are de-duplicated by title and capped
/// at `max_articles`.
#[derive(Debug, Clone)]
pub struct Augmenter {
    topics: &'static [Topic],
    symptoms: &'static [&'static str],
    max_articles: usize,
}

impl Default for Augmenter {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Augmenter {
    pub fn new(max_articles: usize) -> Self {
        Self {
            topics: TOPICS,
            symptoms: SYMPTOM_KEYWORDS,
            max_articles,
        }
    }

    pub fn augment(&self, reply: &str, user_message: &str) -> String {
        let lower = user_message.to_lowercase();
        let mut reply = reply.to_string();

        if self.needs_disclaimer(&lower) {
            reply.push_str("\n\n");
            reply.push_str(MEDICAL_DISCLAIMER);
        }

        let articles = self.related_articles(&lower);
        if !articles.is_empty() {
            reply.push_str("\n\n");
            reply.push_str(RELATED_ARTICLES_HEADING);
            for article in articles {
                reply.push_str(&format!("\n- **[{}]({})**", article.title, article.url));
                if !article.description.is_empty() {
                    reply.push_str(&format!(": {}", article.description));
                }
            }
        }

        reply
    }

    fn needs_disclaimer(&self, lower: &str) -> bool {
        self.symptoms.iter().any(|symptom| lower.contains(symptom))
    }

    fn related_articles(&self, lower: &str) -> Vec<&'static Article> {
        let mut seen = HashSet::new();

        self.topics
            .iter()
            .filter(|topic| topic.matches(lower))
            .flat_map(|topic| topic.articles.iter())
            .filter(|article| seen.insert(article.title))
            .take(self.max_articles)
            .collect()
    }
}
