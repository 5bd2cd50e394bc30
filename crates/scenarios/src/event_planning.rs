//! Event planning
//!
//! The venue task needs human approval and returns a `VenueDetails` record
//! written to `venue_details.json`. Logistics runs asynchronously; marketing
//! waits for the venue and writes `marketing_report.md`.

use contracts::{
    ContractError, CrewBlueprint, CrewSettings, FieldKind, FieldSpec, OutputSchema, ParameterSpec,
    TaskSpec, ToolRef, WorkerSpec,
};

use crate::{assemble_blueprint, check_tasks};

pub const NAME: &str = "event-planning";

pub const VENUE_FILE: &str = "venue_details.json";
pub const MARKETING_FILE: &str = "marketing_report.md";

pub fn parameters() -> Vec<ParameterSpec> {
    vec![
        ParameterSpec::with_default("event_topic", "Tech Innovation Conference"),
        ParameterSpec::with_default(
            "event_description",
            "A gathering of tech innovators and industry leaders \
             to explore future technologies.",
        ),
        ParameterSpec::with_default("event_city", "San Francisco"),
        ParameterSpec::with_default("tentative_date", "2024-09-15"),
        ParameterSpec::with_default("expected_participants", 500),
        ParameterSpec::with_default("budget", 20000).describe("Total budget in USD"),
        ParameterSpec::with_default("venue_type", "Conference Hall"),
    ]
}

/// Record the venue task must return
pub fn venue_details() -> OutputSchema {
    OutputSchema::new(
        "VenueDetails",
        vec![
            FieldSpec::new("name", FieldKind::String),
            FieldSpec::new("address", FieldKind::String),
            FieldSpec::new("capacity", FieldKind::Integer),
            FieldSpec::new("booking_status", FieldKind::String),
        ],
    )
}

pub fn build_workers() -> Vec<WorkerSpec> {
    vec![
        WorkerSpec::new(
            "venue_coordinator",
            "Venue Coordinator",
            "Identify and book an appropriate venue \
             based on event requirements",
            "With a keen sense of space and \
             understanding of event logistics, \
             you excel at finding and securing \
             the perfect venue that fits the event's theme, \
             size, and budget constraints.",
        ),
        WorkerSpec::new(
            "logistics_manager",
            "Logistics Manager",
            "Manage all logistics for the event \
             including catering and equipment",
            "Organized and detail-oriented, \
             you ensure that every logistical aspect of the event \
             from catering to equipment setup \
             is flawlessly executed to create a seamless experience.",
        ),
        WorkerSpec::new(
            "marketing_communications_agent",
            "Marketing and Communications Agent",
            "Effectively market the event and \
             communicate with participants",
            "Creative and communicative, \
             you craft compelling messages and \
             engage with potential attendees \
             to maximize event exposure and participation.",
        ),
    ]
    .into_iter()
    .map(|worker| {
        worker
            .allow_delegation(true)
            .verbose(true)
            .with_tools([ToolRef::Search, ToolRef::scrape_any()])
    })
    .collect()
}

pub fn build_tasks(workers: &[WorkerSpec]) -> Result<Vec<TaskSpec>, ContractError> {
    let tasks = vec![
        TaskSpec::new(
            "venue",
            "venue_coordinator",
            "Find a venue in {event_city} \
             that meets criteria for {event_topic}.",
            "All the details of a specifically chosen \
             venue you found to accommodate the event.",
        )
        .human_input(true)
        .structured(venue_details())
        .output_file(VENUE_FILE),
        TaskSpec::new(
            "logistics",
            "logistics_manager",
            "Coordinate catering and \
             equipment for an event \
             with {expected_participants} participants \
             on {tentative_date}.",
            "Confirmation of all logistics arrangements \
             including catering and equipment setup.",
        )
        .human_input(true)
        .async_execution(true),
        TaskSpec::new(
            "marketing",
            "marketing_communications_agent",
            "Promote the {event_topic} \
             aiming to engage at least \
             {expected_participants} potential attendees.",
            "Report on marketing activities \
             and attendee engagement formatted as markdown.",
        )
        .depends_on(["venue"])
        .async_execution(true)
        .output_file(MARKETING_FILE),
    ];

    check_tasks(NAME, workers, &tasks, &parameters())?;
    Ok(tasks)
}

pub fn blueprint() -> Result<CrewBlueprint, ContractError> {
    assemble_blueprint(
        NAME,
        CrewSettings {
            verbose: true,
            memory: false,
        },
        parameters(),
        build_workers(),
        build_tasks,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ExecutionPlan, OutputFormat};

    #[test]
    fn test_marketing_waits_for_venue() {
        let bp = blueprint().unwrap();
        let plan = ExecutionPlan::build(bp.tasks.iter().map(TaskSpec::plan_entry)).unwrap();

        assert_eq!(plan.stage_of("venue"), Some(0));
        assert_eq!(plan.stage_of("logistics"), Some(0));
        assert_eq!(plan.stage_of("marketing"), Some(1));
    }

    #[test]
    fn test_venue_contract() {
        let tasks = build_tasks(&build_workers()).unwrap();
        let venue = &tasks[0];
        assert!(venue.human_input);
        assert!(!venue.async_execution);
        assert_eq!(
            venue.output_format,
            OutputFormat::Structured {
                schema: venue_details()
            }
        );
        assert_eq!(venue.output_file.as_deref(), Some(std::path::Path::new(VENUE_FILE)));
    }

    #[test]
    fn test_integer_default_is_stringified() {
        let defaults = blueprint().unwrap().default_parameters();
        assert_eq!(defaults.get("expected_participants"), Some("500"));
        assert_eq!(defaults.get("budget"), Some("20000"));
    }
}
