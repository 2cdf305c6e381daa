use study_core::model::{Choice, Difficulty, QuestionId, QuizQuestion, QuizQuestionError};

struct BankEntry {
    id: &'static str,
    question: &'static str,
    options: [&'static str; 4],
    correct: Choice,
    explanation: &'static str,
    topic: &'static str,
    difficulty: Difficulty,
}

const BASELINE: [BankEntry; 5] = [
    BankEntry {
        id: "1",
        question: "What is the time complexity of searching in a balanced binary search tree?",
        options: ["O(n)", "O(log n)", "O(n log n)", "O(1)"],
        correct: Choice::B,
        explanation: "In a balanced BST, the height is log n, \
                      so search operations take O(log n) time.",
        topic: "Binary Trees",
        difficulty: Difficulty::Medium,
    },
    BankEntry {
        id: "2",
        question: "Which data structure follows the LIFO (Last In, First Out) principle?",
        options: ["Queue", "Stack", "Array", "Linked List"],
        correct: Choice::B,
        explanation: "A stack follows LIFO principle where the last element added \
                      is the first one removed.",
        topic: "Stacks and Queues",
        difficulty: Difficulty::Easy,
    },
    BankEntry {
        id: "3",
        question: "What is the main advantage of using hash tables?",
        options: [
            "Sorted data",
            "Fast search operations",
            "Memory efficiency",
            "Simple implementation",
        ],
        correct: Choice::B,
        explanation: "Hash tables provide O(1) average time complexity \
                      for search, insert, and delete operations.",
        topic: "Hash Tables",
        difficulty: Difficulty::Medium,
    },
    BankEntry {
        id: "4",
        question: "In database normalization, what does the First Normal Form (1NF) ensure?",
        options: [
            "No partial dependencies",
            "Atomic values in each cell",
            "No transitive dependencies",
            "No redundant data",
        ],
        correct: Choice::B,
        explanation: "1NF ensures that each table cell contains only atomic (indivisible) values \
                      and each record is unique.",
        topic: "Database Normalization",
        difficulty: Difficulty::Hard,
    },
    BankEntry {
        id: "5",
        question: "Which sorting algorithm has the best average-case time complexity?",
        options: [
            "Bubble Sort",
            "Merge Sort",
            "Selection Sort",
            "Insertion Sort",
        ],
        correct: Choice::B,
        explanation: "Merge Sort has O(n log n) time complexity in all cases, \
                      making it one of the most efficient sorting algorithms.",
        topic: "Sorting Algorithms",
        difficulty: Difficulty::Medium,
    },
];

/// The fixed baseline questions every quiz starts with.
///
/// # Errors
///
/// Returns `QuizQuestionError` if a bank entry is malformed.
pub fn baseline_questions() -> Result<Vec<QuizQuestion>, QuizQuestionError> {
    BASELINE
        .iter()
        .map(|entry| {
            QuizQuestion::new(
                QuestionId::new(entry.id),
                entry.question,
                entry.options.map(String::from),
                entry.correct,
                entry.explanation,
                entry.topic,
                entry.difficulty,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_has_five_non_adaptive_questions() {
        let bank = baseline_questions().unwrap();
        assert_eq!(bank.len(), 5);
        assert!(bank.iter().all(|q| !q.is_adaptive()));
        assert_eq!(bank[1].topic(), "Stacks and Queues");
        assert_eq!(bank[1].options()[bank[1].correct_answer_index()], "Stack");
    }
}
