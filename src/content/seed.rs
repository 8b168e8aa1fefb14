//! Built-in demo catalog: two short English lessons with Hindi, Spanish
//! and French instruction text. Production deployments construct their
//! own [`LessonCatalog`] from the content pipeline; this one backs tests
//! and local demos.

use std::collections::HashMap;

use super::{Lesson, LessonCatalog, LessonStep, StepTranslation, UiMessages};

fn translation(prompt: &str, success: &str, failure: &str) -> StepTranslation {
    StepTranslation {
        agent_prompt: prompt.to_string(),
        success_feedback: success.to_string(),
        failure_feedback: failure.to_string(),
    }
}

fn translations(entries: &[(&str, StepTranslation)]) -> HashMap<String, StepTranslation> {
    entries
        .iter()
        .map(|(code, t)| (code.to_string(), t.clone()))
        .collect()
}

pub fn demo_catalog() -> LessonCatalog {
    let lessons = vec![
        Lesson {
            id: 1,
            title: "Lesson 1: Greetings".to_string(),
            description: "Learn basic greetings in English.".to_string(),
            target_language: "en".to_string(),
        },
        Lesson {
            id: 2,
            title: "Lesson 2: Common Phrases".to_string(),
            description: "Learn common phrases for everyday conversations.".to_string(),
            target_language: "en".to_string(),
        },
    ];

    let steps = vec![
        LessonStep {
            id: 1,
            lesson_id: 1,
            target_phrase: "Hello".to_string(),
            expected_user_response: Some("Hello".to_string()),
            translations: translations(&[
                (
                    "en",
                    translation(
                        "Let's start with a simple greeting. How do you say 'Hello' in English?",
                        "Great job! 'Hello' is correct.",
                        "Not quite. The correct answer is 'Hello'. Let's try again.",
                    ),
                ),
                (
                    "hi",
                    translation(
                        "चलिए एक सरल अभिवादन से शुरू करते हैं। अंग्रेजी में 'Hello' कैसे कहते हैं?",
                        "बहुत बढ़िया! 'Hello' सही है।",
                        "बिल्कुल नहीं। सही उत्तर 'Hello' है। फिर से कोशिश करते हैं।",
                    ),
                ),
                (
                    "es",
                    translation(
                        "Comencemos con un saludo simple. ¿Cómo se dice 'Hello' en inglés?",
                        "¡Muy bien! 'Hello' es correcto.",
                        "No del todo. La respuesta correcta es 'Hello'. Intentemos de nuevo.",
                    ),
                ),
                (
                    "fr",
                    translation(
                        "Commençons par une salutation simple. Comment dit-on 'Hello' en anglais?",
                        "Excellent! 'Hello' est correct.",
                        "Pas tout à fait. La bonne réponse est 'Hello'. Essayons encore.",
                    ),
                ),
            ]),
            next_step_id: Some(2),
        },
        LessonStep {
            id: 2,
            lesson_id: 1,
            target_phrase: "Goodbye".to_string(),
            expected_user_response: Some("Goodbye".to_string()),
            translations: translations(&[
                (
                    "en",
                    translation(
                        "Now, how do you say 'Goodbye' in English?",
                        "Excellent! 'Goodbye' is correct.",
                        "That's not it. The correct answer is 'Goodbye'. Let's practice.",
                    ),
                ),
                (
                    "hi",
                    translation(
                        "अब, अंग्रेजी में 'Goodbye' कैसे कहते हैं?",
                        "उत्कृष्ट! 'Goodbye' सही है।",
                        "यह नहीं है। सही उत्तर 'Goodbye' है। अभ्यास करते हैं।",
                    ),
                ),
                (
                    "es",
                    translation(
                        "Ahora, ¿cómo se dice 'Goodbye' en inglés?",
                        "¡Excelente! 'Goodbye' es correcto.",
                        "Eso no es. La respuesta correcta es 'Goodbye'. Practiquemos.",
                    ),
                ),
                (
                    "fr",
                    translation(
                        "Maintenant, comment dit-on 'Goodbye' en anglais?",
                        "Excellent! 'Goodbye' est correct.",
                        "Ce n'est pas ça. La bonne réponse est 'Goodbye'. Pratiquons.",
                    ),
                ),
            ]),
            next_step_id: None,
        },
        LessonStep {
            id: 3,
            lesson_id: 2,
            target_phrase: "Thank you".to_string(),
            expected_user_response: Some("Thank you".to_string()),
            translations: translations(&[
                (
                    "en",
                    translation(
                        "Let's learn a useful phrase. How do you say 'Thank you' in English?",
                        "Perfect! 'Thank you' is a very important phrase.",
                        "Almost there. The correct phrase is 'Thank you'.",
                    ),
                ),
                (
                    "hi",
                    translation(
                        "चलिए एक उपयोगी वाक्यांश सीखते हैं। अंग्रेजी में 'Thank you' कैसे कहते हैं?",
                        "बिल्कुल सही! 'Thank you' एक बहुत महत्वपूर्ण वाक्यांश है।",
                        "लगभग सही। सही वाक्यांश 'Thank you' है।",
                    ),
                ),
                (
                    "es",
                    translation(
                        "Aprendamos una frase útil. ¿Cómo se dice 'Thank you' en inglés?",
                        "¡Perfecto! 'Thank you' es una frase muy importante.",
                        "Casi. La frase correcta es 'Thank you'.",
                    ),
                ),
                (
                    "fr",
                    translation(
                        "Apprenons une phrase utile. Comment dit-on 'Thank you' en anglais?",
                        "Parfait! 'Thank you' est une phrase très importante.",
                        "Presque. La phrase correcte est 'Thank you'.",
                    ),
                ),
            ]),
            next_step_id: Some(4),
        },
        LessonStep {
            id: 4,
            lesson_id: 2,
            target_phrase: "You're welcome".to_string(),
            expected_user_response: Some("You're welcome".to_string()),
            translations: translations(&[
                (
                    "en",
                    translation(
                        "How about 'You're welcome'?",
                        "You've got it!",
                        "Not quite. It's 'You're welcome'.",
                    ),
                ),
                (
                    "hi",
                    translation(
                        "'You're welcome' के बारे में क्या?",
                        "आपने समझ लिया!",
                        "बिल्कुल नहीं। यह 'You're welcome' है।",
                    ),
                ),
                (
                    "es",
                    translation(
                        "¿Qué tal 'You're welcome'?",
                        "¡Lo tienes!",
                        "No del todo. Es 'You're welcome'.",
                    ),
                ),
                (
                    "fr",
                    translation(
                        "Et 'You're welcome'?",
                        "Vous l'avez!",
                        "Pas tout à fait. C'est 'You're welcome'.",
                    ),
                ),
            ]),
            next_step_id: None,
        },
    ];

    let mut messages = HashMap::new();
    messages.insert(
        "en".to_string(),
        UiMessages {
            all_lessons_complete:
                "Congratulations! You have completed every lesson. Come back soon for new phrases."
                    .to_string(),
            lesson_finished_suffix: "You have finished this lesson!".to_string(),
        },
    );
    messages.insert(
        "hi".to_string(),
        UiMessages {
            all_lessons_complete:
                "बधाई हो! आपने सभी पाठ पूरे कर लिए हैं। नए वाक्यांशों के लिए जल्द वापस आएं।"
                    .to_string(),
            lesson_finished_suffix: "आपने यह पाठ पूरा कर लिया है!".to_string(),
        },
    );
    messages.insert(
        "es".to_string(),
        UiMessages {
            all_lessons_complete:
                "¡Felicidades! Has completado todas las lecciones. Vuelve pronto por nuevas frases."
                    .to_string(),
            lesson_finished_suffix: "¡Has terminado esta lección!".to_string(),
        },
    );
    messages.insert(
        "fr".to_string(),
        UiMessages {
            all_lessons_complete:
                "Félicitations! Vous avez terminé toutes les leçons. Revenez bientôt pour de nouvelles phrases."
                    .to_string(),
            lesson_finished_suffix: "Vous avez terminé cette leçon!".to_string(),
        },
    );

    LessonCatalog::new("en", lessons, steps, messages)
}
