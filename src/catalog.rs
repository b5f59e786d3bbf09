use axum::{debug_handler, Json};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub level: &'static str,
    pub duration: &'static str,
    pub topics: &'static [&'static str],
}

/// The catalog is fixed in-process data; no store round-trip.
pub const COURSES: &[Course] = &[
    Course {
        id: "1",
        title: "JavaScript Fundamentals",
        description: "Learn the core concepts of JavaScript programming",
        level: "Beginner",
        duration: "4 weeks",
        topics: &[
            "Variables & Data Types",
            "Functions",
            "DOM Manipulation",
            "ES6+ Features",
        ],
    },
    Course {
        id: "2",
        title: "React Native Development",
        description: "Build cross-platform mobile apps with React Native",
        level: "Intermediate",
        duration: "6 weeks",
        topics: &[
            "Component Design",
            "Navigation",
            "State Management",
            "API Integration",
        ],
    },
    Course {
        id: "3",
        title: "Advanced Node.js",
        description: "Master server-side JavaScript with Node.js",
        level: "Advanced",
        duration: "8 weeks",
        topics: &[
            "Express Framework",
            "RESTful APIs",
            "Authentication",
            "Database Integration",
        ],
    },
    Course {
        id: "4",
        title: "UI/UX Design Principles",
        description: "Learn to create engaging and user-friendly interfaces",
        level: "Beginner",
        duration: "5 weeks",
        topics: &[
            "Design Thinking",
            "Wireframing",
            "Prototyping",
            "User Testing",
        ],
    },
];

#[debug_handler]
pub async fn catalog() -> Json<&'static [Course]> {
    Json(COURSES)
}
