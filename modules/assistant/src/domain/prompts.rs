//! Prompt templates sent to the model.

use chrono::NaiveDateTime;
use tasks::Task;

const LONG_DATE: &str = "%A, %d %B %Y, %H:%M";
pub const SHORT_DATE: &str = "%d/%m/%Y";

pub fn classify_voice(input: &str) -> String {
    format!(
        "Classify the following user input into one of three categories:
- CREATE_TASK
- UPDATE_TASK
- ADD_REVIEW

Some example action verbs for each category:
- CREATE_TASK: create,add (new),schedule,plan,set up,arrange,assign,make a task,put on calendar,log (new task),add to list,note down,draft,prepare (task).

- UPDATE_TASK: update,modify,change,edit,reschedule,shift,move,postpone,advance (earlier),delay,rename,adjust,revise,reprioritize.

- ADD_REVIEW: add review, summarize,attach summary,add notes, attach a note, note what happened, log outcome,add feedback,leave comments, record what was done,write review,provide recap, summarize result, jot down reflection, add summary to task.

Only output one of the three labels above.

Input: {input}"
    )
}

pub fn classify_assistant(input: &str) -> String {
    format!(
        "Classify the following user input into one of three categories:
- CREATE_TASK
- MODIFY_TASK
- ADD_REVIEW

Only output one of the three labels above.

Input: {input}"
    )
}

pub fn extract_task(text: &str, now: NaiveDateTime) -> String {
    format!(
        "Parse the following text and classify it into attributes:
- task_title (generate one from the info if not explicitly provided)
- description (generate one from the info if not explicitly provided)
- time_required (in decimal)
- schedule_date (DD/MM/YYYY), today is {today}
- schedule_from (HH:MM 24hr format)
- schedule_to (HH:MM 24hr format)
- tag (one per task, uppercase, default 'OTHER')
- priority (default 'Medium', can only hold High, Medium and Low values)

Text: {text}
And create a JSON type output with these attributes as keys. If you are not able to extract an attribute, fill \"F\" as the value",
        today = now.format(LONG_DATE)
    )
}

pub fn extract_title(query: &str) -> String {
    format!(
        "Extract the exact task title from this update request. Output only the title.\nText: {query}"
    )
}

pub fn parse_update(query: &str, now: NaiveDateTime) -> String {
    format!(
        "Parse the update details from this query. Output JSON with these fields:
- description (string or F)
- schedule_date (DD/MM/YYYY or F)
- schedule_from (HH:MM 24hr format or F)
- schedule_to (HH:MM 24hr format or F)
- tag (STUDY/WORK/READ/OTHER or F)
- priority (High/Medium/Low or F)
- time_required (decimal hours or F)

Query: {query}
Current date: {now}",
        now = now.format(LONG_DATE)
    )
}

pub fn identify_review_target(query: &str, now: NaiveDateTime) -> String {
    format!(
        "The user wants to add a review to a task. Based on the query below, identify the task title and schedule date.

User query: {query}

Respond with:
1. The exact task title from this request
2. The scheduled date (in DD/MM/YYYY format) today is {today}

The output should be in JSON format:
{{
    \"task_title\": \"...\",
    \"scheduled_date\": \"DD/MM/YYYY\"
}}",
        today = now.format(SHORT_DATE)
    )
}

pub fn write_review(text: &str) -> String {
    format!(
        "You will receive a text describing a task, event, or activity. Your job is to write a short review summarizing the main actions or outcomes, focusing on what was achieved or done.

- Do not simply repeat the original text.
- Focus on the key actions, results, or commitments.
- Keep the review in a short, natural string.
- Example:

Input: Hi, I called my mom for birthday on 10th of this May, she was very happy and she promised to visit us in July this year.
Review: Successfully called mom for her birthday; she was happy and plans to visit in July.

Here's the text:

Text: {text}
Output should be a string."
    )
}

pub fn daily_summary(tasks: &[Task]) -> String {
    let list = tasks
        .iter()
        .map(|t| {
            format!(
                "- {} (Priority: {}, Description: {}, Review: {}, Schedule_from: {}, Schedule_to: {})",
                t.task_title,
                t.priority,
                t.description,
                t.review.as_deref().unwrap_or("None"),
                t.schedule_from,
                t.schedule_to
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Generate a short summary of today's tasks. Use the reviews and description specifically for the tasks. Create a separate short paragraph for each task. Order should be chronological.

Today's tasks:
{list}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 10)
            .and_then(|d| d.and_hms_opt(14, 5, 0))
            .unwrap()
    }

    #[test]
    fn extraction_prompt_embeds_the_long_date() {
        let p = extract_task("gym tomorrow", now());
        assert!(p.contains("today is Saturday, 10 May 2025, 14:05"));
        assert!(p.contains("Text: gym tomorrow"));
        assert!(p.contains("fill \"F\" as the value"));
    }

    #[test]
    fn review_target_prompt_uses_the_short_date() {
        let p = identify_review_target("add a review", now());
        assert!(p.contains("today is 10/05/2025"));
        assert!(p.contains("\"scheduled_date\": \"DD/MM/YYYY\""));
    }

    #[test]
    fn summary_lists_each_task() {
        let task = Task {
            id: 1,
            user_id: 1,
            task_title: "Gym".into(),
            description: "legs".into(),
            priority: "High".into(),
            time_required: "F".into(),
            schedule_date: "10/05/2025".into(),
            schedule_from: "08:00".into(),
            schedule_to: "09:00".into(),
            tag: "OTHER".into(),
            review: None,
            completed: false,
            created_at: now(),
        };
        let p = daily_summary(&[task]);
        assert!(p.ends_with(
            "- Gym (Priority: High, Description: legs, Review: None, Schedule_from: 08:00, Schedule_to: 09:00)"
        ));
    }
}
