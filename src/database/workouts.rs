// ABOUTME: Workout persistence: parsed workouts with their exercises and sets
// ABOUTME: Inserts run in one transaction; reads rebuild the nested model in stored order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{ParsedExercise, ParsedSet, ParsedWorkout, StoredWorkout};

fn position(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

fn parse_timestamp(raw: &str, column: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            AppError::invalid_format(format!("Invalid {column} timestamp '{raw}': {e}"))
        })
}

fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|e| AppError::invalid_format(format!("Invalid UUID '{raw}': {e}")))
}

fn row_to_set(row: &SqliteRow) -> ParsedSet {
    ParsedSet {
        reps: row
            .get::<Option<i64>, _>("reps")
            .and_then(|r| u32::try_from(r).ok()),
        weight: row.get("weight"),
        duration: row.get("duration"),
        distance: row.get("distance"),
        notes: row.get("notes"),
    }
}

impl Database {
    /// Store a parsed workout for a user
    ///
    /// # Errors
    ///
    /// Returns a database error if any insert fails; nothing is stored then.
    #[instrument(skip(self, workout), fields(exercises = workout.exercises.len()))]
    pub async fn create_workout(
        &self,
        user_id: &str,
        workout: &ParsedWorkout,
    ) -> AppResult<StoredWorkout> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO workouts (id, user_id, name, date, duration, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(id.to_string())
        .bind(user_id)
        .bind(&workout.name)
        .bind(workout.date.to_rfc3339())
        .bind(workout.duration)
        .bind(&workout.notes)
        .bind(created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert workout: {e}")))?;

        for (exercise_index, exercise) in workout.exercises.iter().enumerate() {
            let exercise_id = Uuid::new_v4().to_string();
            sqlx::query(
                r"
                INSERT INTO workout_exercises (id, workout_id, position, name, notes)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(&exercise_id)
            .bind(id.to_string())
            .bind(position(exercise_index))
            .bind(&exercise.name)
            .bind(&exercise.notes)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to insert exercise: {e}")))?;

            for (set_index, set) in exercise.sets.iter().enumerate() {
                sqlx::query(
                    r"
                    INSERT INTO workout_sets
                        (id, exercise_id, position, reps, weight, duration, distance, notes)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    ",
                )
                .bind(Uuid::new_v4().to_string())
                .bind(&exercise_id)
                .bind(position(set_index))
                .bind(set.reps.map(i64::from))
                .bind(set.weight)
                .bind(set.duration)
                .bind(set.distance)
                .bind(&set.notes)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to insert set: {e}")))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit workout: {e}")))?;

        debug!(%id, sets = workout.total_sets(), "Stored workout");
        Ok(StoredWorkout {
            id,
            user_id: user_id.to_owned(),
            created_at,
            workout: workout.clone(),
        })
    }

    /// Load a stored workout by id
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails, or `InvalidFormat` if a stored
    /// id or timestamp is corrupt.
    pub async fn get_workout(&self, id: Uuid) -> AppResult<Option<StoredWorkout>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, name, date, duration, notes, created_at
            FROM workouts WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get workout: {e}")))?;

        match row {
            Some(row) => self.row_to_stored_workout(&row).await.map(Some),
            None => Ok(None),
        }
    }

    /// Most recent workouts of a user, newest first
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails, or `InvalidFormat` if a stored
    /// id or timestamp is corrupt.
    pub async fn list_workouts(&self, user_id: &str, limit: u32) -> AppResult<Vec<StoredWorkout>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, name, date, duration, notes, created_at
            FROM workouts WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            ",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list workouts: {e}")))?;

        let mut workouts = Vec::with_capacity(rows.len());
        for row in &rows {
            workouts.push(self.row_to_stored_workout(row).await?);
        }
        Ok(workouts)
    }

    /// Delete a workout and its exercises and sets
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no workout has this id, or a database
    /// error if a delete fails.
    pub async fn delete_workout(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            DELETE FROM workout_sets WHERE exercise_id IN
                (SELECT id FROM workout_exercises WHERE workout_id = $1)
            ",
        )
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete sets: {e}")))?;

        sqlx::query("DELETE FROM workout_exercises WHERE workout_id = $1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete exercises: {e}")))?;

        let result = sqlx::query("DELETE FROM workouts WHERE id = $1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete workout: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Workout {id}")));
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit delete: {e}")))?;
        Ok(())
    }

    async fn row_to_stored_workout(&self, row: &SqliteRow) -> AppResult<StoredWorkout> {
        let id_str: String = row.get("id");
        let date: String = row.get("date");
        let created_at: String = row.get("created_at");

        let workout = ParsedWorkout {
            name: row.get("name"),
            date: parse_timestamp(&date, "date")?,
            duration: row.get("duration"),
            notes: row.get("notes"),
            exercises: self.load_exercises(&id_str).await?,
        };

        Ok(StoredWorkout {
            id: parse_id(&id_str)?,
            user_id: row.get("user_id"),
            created_at: parse_timestamp(&created_at, "created_at")?,
            workout,
        })
    }

    async fn load_exercises(&self, workout_id: &str) -> AppResult<Vec<ParsedExercise>> {
        let exercise_rows = sqlx::query(
            r"
            SELECT id, name, notes FROM workout_exercises
            WHERE workout_id = $1
            ORDER BY position
            ",
        )
        .bind(workout_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load exercises: {e}")))?;

        let set_rows = sqlx::query(
            r"
            SELECT s.exercise_id, s.reps, s.weight, s.duration, s.distance, s.notes
            FROM workout_sets s
            JOIN workout_exercises e ON e.id = s.exercise_id
            WHERE e.workout_id = $1
            ORDER BY e.position, s.position
            ",
        )
        .bind(workout_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load sets: {e}")))?;

        let mut sets_by_exercise: HashMap<String, Vec<ParsedSet>> = HashMap::new();
        for row in &set_rows {
            sets_by_exercise
                .entry(row.get("exercise_id"))
                .or_default()
                .push(row_to_set(row));
        }

        Ok(exercise_rows
            .iter()
            .map(|row| {
                let exercise_id: String = row.get("id");
                ParsedExercise {
                    name: row.get("name"),
                    notes: row.get("notes"),
                    sets: sets_by_exercise.remove(&exercise_id).unwrap_or_default(),
                }
            })
            .collect())
    }
}
