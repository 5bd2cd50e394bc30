//! Multi-agent customer support
//!
//! A support representative drafts the answer with the crewAI docs page
//! attached as a task-level scrape tool; a QA specialist reviews it.

use contracts::{ContractError, CrewBlueprint, CrewSettings, ParameterSpec, TaskSpec, ToolRef, WorkerSpec};

use crate::{assemble_blueprint, check_tasks};

pub const NAME: &str = "customer-support";

/// Page handed to the representative's scrape tool
pub const DOCS_URL: &str = "https://docs.crewai.com/how-to/Creating-a-Crew-and-kick-it-off/";

pub fn parameters() -> Vec<ParameterSpec> {
    vec![
        ParameterSpec::with_default("customer", "DeepLearningAI")
            .describe("Company that reached out"),
        ParameterSpec::with_default("person", "Andrew Ng")
            .describe("Person who sent the inquiry"),
        ParameterSpec::with_default(
            "inquiry",
            "I need help with setting up a Crew and kicking it off, \
             specifically how can I add memory to my crew? \
             Can you provide guidance?",
        )
        .describe("The question to answer"),
    ]
}

pub fn build_workers() -> Vec<WorkerSpec> {
    vec![
        WorkerSpec::new(
            "support_agent",
            "Senior Support Representative",
            "Be the most friendly and helpful \
             support representative in your team",
            "You work at crewAI (https://crewai.com) and \
             are now working on providing \
             support to {customer}, a super important customer \
             for your company. \
             You need to make sure that you provide the best support! \
             Make sure to provide full complete answers, \
             and make no assumptions.",
        )
        .allow_delegation(false)
        .verbose(true),
        WorkerSpec::new(
            "support_quality_assurance_agent",
            "Support Quality Assurance Specialist",
            "Get recognition for providing the \
             best support quality assurance in your team",
            "You work at crewAI (https://crewai.com) and \
             are now working with your team \
             on a request from {customer} ensuring that \
             the support representative is \
             providing the best support possible.\n\
             You need to make sure that the support representative \
             is providing full \
             complete answers, and make no assumptions.",
        )
        .allow_delegation(true)
        .verbose(true),
    ]
}

pub fn build_tasks(workers: &[WorkerSpec]) -> Result<Vec<TaskSpec>, ContractError> {
    let tasks = vec![
        TaskSpec::new(
            "inquiry_resolution",
            "support_agent",
            "{customer} just reached out with a super important ask:\n\
             {inquiry}\n\n\
             {person} from {customer} is the one that reached out. \
             Make sure to use everything you know \
             to provide the best support possible. \
             You must strive to provide a complete \
             and accurate response to the customer's inquiry.",
            "A detailed, informative response to the \
             customer's inquiry that addresses \
             all aspects of their question.\n\
             The response should include references \
             to everything you used to find the answer, \
             including external data or solutions. \
             Ensure the answer is complete, \
             leaving no questions unanswered, and maintain a helpful and friendly \
             tone throughout.",
        )
        .with_tools([ToolRef::scrape(DOCS_URL)]),
        TaskSpec::new(
            "quality_assurance_review",
            "support_quality_assurance_agent",
            "Review the response drafted by the Senior Support Representative \
             for {customer}'s inquiry. \
             Ensure that the answer is comprehensive, accurate, and adheres to the \
             high-quality standards expected for customer support.\n\
             Verify that all parts of the customer's inquiry \
             have been addressed \
             thoroughly, with a helpful and friendly tone.\n\
             Check for references and sources used to \
             find the information, \
             ensuring the response is well-supported and \
             leaves no questions unanswered.",
            "A final, detailed, and informative response \
             ready to be sent to the customer.\n\
             This response should fully address the \
             customer's inquiry, incorporating all \
             relevant feedback and improvements.\n\
             Don't be too formal, we are a chill and cool company \
             but maintain a professional and friendly tone throughout.",
        )
        .depends_on(["inquiry_resolution"]),
    ];

    check_tasks(NAME, workers, &tasks, &parameters())?;
    Ok(tasks)
}

pub fn blueprint() -> Result<CrewBlueprint, ContractError> {
    assemble_blueprint(
        NAME,
        CrewSettings {
            verbose: true,
            memory: true,
        },
        parameters(),
        build_workers(),
        build_tasks,
    )
}
