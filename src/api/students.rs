// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sample protected resource.
//!
//! Both handlers sit behind a permission guard; they only see requests whose
//! token carried the route's permission.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::auth::Auth;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Student {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct StudentsResponse {
    pub success: bool,
    pub students: Vec<Student>,
    /// `sub` of the caller
    pub requested_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StudentCreatedResponse {
    pub success: bool,
    pub student: Student,
    pub created_by: Option<String>,
}

fn roster() -> Vec<Student> {
    ["Ada Lovelace", "Alan Turing", "Grace Hopper"]
        .into_iter()
        .zip(1..)
        .map(|(name, id)| Student {
            id,
            name: name.to_string(),
        })
        .collect()
}

/// `GET /students`, requires `get:students`.
pub async fn list_students(Auth(authorized): Auth) -> Json<StudentsResponse> {
    Json(StudentsResponse {
        success: true,
        students: roster(),
        requested_by: authorized.claims.subject().map(str::to_string),
    })
}

/// `POST /students`, requires `post:students`.
pub async fn create_student(
    Auth(authorized): Auth,
    Json(request): Json<CreateStudentRequest>,
) -> (StatusCode, Json<StudentCreatedResponse>) {
    let student = Student {
        id: roster().len() as u32 + 1,
        name: request.name,
    };

    tracing::info!(id = student.id, "Student created");

    (
        StatusCode::CREATED,
        Json(StudentCreatedResponse {
            success: true,
            student,
            created_by: authorized.claims.subject().map(str::to_string),
        }),
    )
}
