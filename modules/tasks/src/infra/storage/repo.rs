use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::contract::model::{LabelCount, Task, TaskFields};

const COLUMNS: &str = "id, user_id, task_title, description, priority, time_required, \
     schedule_date, schedule_from, schedule_to, tag, review, completed, created_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub user_id: i64,
    pub task_title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub time_required: Option<String>,
    pub schedule_date: Option<String>,
    pub schedule_from: Option<String>,
    pub schedule_to: Option<String>,
    pub tag: Option<String>,
    pub review: Option<String>,
    pub completed: bool,
    pub created_at: NaiveDateTime,
}

impl From<TaskRow> for Task {
    fn from(r: TaskRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            task_title: r.task_title,
            description: r.description.unwrap_or_default(),
            priority: r.priority.unwrap_or_default(),
            time_required: r.time_required.unwrap_or_default(),
            schedule_date: r.schedule_date.unwrap_or_default(),
            schedule_from: r.schedule_from.unwrap_or_default(),
            schedule_to: r.schedule_to.unwrap_or_default(),
            tag: r.tag.unwrap_or_default(),
            review: r.review,
            completed: r.completed,
            created_at: r.created_at,
        }
    }
}

/// SQL access to `tasks`. Every statement is filtered by owner.
#[derive(Clone)]
pub struct TasksRepo {
    pool: SqlitePool,
}

impl TasksRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<Task>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM tasks WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    pub async fn get(&self, user_id: i64, id: i64) -> Result<Option<Task>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM tasks WHERE id = ? AND user_id = ?");
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Task::from))
    }

    pub async fn insert(&self, user_id: i64, f: &TaskFields) -> Result<i64, sqlx::Error> {
        let res = sqlx::query(
            "INSERT INTO tasks (user_id, task_title, description, priority, time_required, \
             schedule_date, schedule_from, schedule_to, tag) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&f.task_title)
        .bind(&f.description)
        .bind(&f.priority)
        .bind(&f.time_required)
        .bind(&f.schedule_date)
        .bind(&f.schedule_from)
        .bind(&f.schedule_to)
        .bind(&f.tag)
        .execute(&self.pool)
        .await?;
        Ok(res.last_insert_rowid())
    }

    /// `false` when no owned row matched.
    pub async fn update(&self, user_id: i64, id: i64, f: &TaskFields) -> Result<bool, sqlx::Error> {
        let res = sqlx::query(
            "UPDATE tasks SET task_title = ?, description = ?, priority = ?, time_required = ?, \
             schedule_date = ?, schedule_from = ?, schedule_to = ?, tag = ? \
             WHERE id = ? AND user_id = ?",
        )
        .bind(&f.task_title)
        .bind(&f.description)
        .bind(&f.priority)
        .bind(&f.time_required)
        .bind(&f.schedule_date)
        .bind(&f.schedule_from)
        .bind(&f.schedule_to)
        .bind(&f.tag)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn set_review(&self, user_id: i64, id: i64, review: &str) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("UPDATE tasks SET review = ? WHERE id = ? AND user_id = ?")
            .bind(review)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn toggle_completed(&self, user_id: i64, id: i64) -> Result<bool, sqlx::Error> {
        let res = sqlx::query(
            "UPDATE tasks SET completed = CASE completed WHEN 1 THEN 0 ELSE 1 END \
             WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Case-insensitive substring match on the title (and optionally the date).
    pub async fn find_matching(
        &self,
        user_id: i64,
        title: &str,
        date: Option<&str>,
    ) -> Result<Option<Task>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM tasks WHERE user_id = ? \
             AND instr(lower(task_title), lower(?)) > 0 \
             AND (? IS NULL OR instr(lower(COALESCE(schedule_date, '')), lower(?)) > 0) \
             ORDER BY id LIMIT 1"
        );
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(user_id)
            .bind(title)
            .bind(date)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Task::from))
    }

    pub async fn on_date(&self, user_id: i64, date: &str) -> Result<Vec<Task>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM tasks WHERE user_id = ? AND schedule_date = ? \
             ORDER BY priority, schedule_from"
        );
        let rows = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(user_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    /// Tasks carrying a schedule date, ordered by date text then start time.
    pub async fn scheduled(&self, user_id: i64) -> Result<Vec<Task>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM tasks WHERE user_id = ? \
             AND schedule_date IS NOT NULL AND schedule_date NOT IN ('', 'F') \
             ORDER BY schedule_date, schedule_from"
        );
        let rows = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    /// `(total, completed)` for one owner.
    pub async fn counts(&self, user_id: i64) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN completed = 1 THEN 1 ELSE 0 END), 0) \
             FROM tasks WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn priority_distribution(&self, user_id: i64) -> Result<Vec<LabelCount>, sqlx::Error> {
        self.distribution(
            "SELECT COALESCE(priority, 'Medium'), COUNT(*) FROM tasks \
             WHERE user_id = ? GROUP BY 1 ORDER BY 1",
            user_id,
        )
        .await
    }

    pub async fn tag_distribution(&self, user_id: i64) -> Result<Vec<LabelCount>, sqlx::Error> {
        self.distribution(
            "SELECT COALESCE(tag, 'OTHER'), COUNT(*) FROM tasks \
             WHERE user_id = ? GROUP BY 1 ORDER BY 1",
            user_id,
        )
        .await
    }

    async fn distribution(&self, sql: &str, user_id: i64) -> Result<Vec<LabelCount>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (String, i64)>(sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(label, count)| LabelCount { label, count })
            .collect())
    }
}
