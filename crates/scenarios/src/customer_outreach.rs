//! Tools for a customer outreach campaign

use contracts::{ContractError, CrewBlueprint, CrewSettings, ParameterSpec, TaskSpec, ToolRef, WorkerSpec};
use toolkit::SENTIMENT_TOOL_NAME;

use crate::{assemble_blueprint, check_tasks};

pub const NAME: &str = "customer-outreach";

/// Directory the profiling task may list
pub const INSTRUCTIONS_DIR: &str = "./instructions";

pub fn parameters() -> Vec<ParameterSpec> {
    vec![
        ParameterSpec::with_default("lead_name", "DeepLearningAI").describe("Target company"),
        ParameterSpec::with_default("industry", "Online Learning Platform")
            .describe("Industry sector of the lead"),
        ParameterSpec::with_default("key_decision_maker", "Andrew Ng")
            .describe("Person the outreach is addressed to"),
        ParameterSpec::with_default("position", "CEO"),
        ParameterSpec::with_default("milestone", "product launch")
            .describe("Recent milestone the campaign refers to"),
    ]
}

pub fn build_workers() -> Vec<WorkerSpec> {
    vec![
        WorkerSpec::new(
            "sales_rep_agent",
            "Sales Representative",
            "Identify high-value leads that match \
             our ideal customer profile",
            "As a part of the dynamic sales team at CrewAI, \
             your mission is to scour \
             the digital landscape for potential leads. \
             Armed with cutting-edge tools \
             and a strategic mindset, you analyze data, \
             trends, and interactions to \
             unearth opportunities that others might overlook. \
             Your work is crucial in paving the way \
             for meaningful engagements and driving the company's growth.",
        ),
        WorkerSpec::new(
            "lead_sales_rep_agent",
            "Lead Sales Representative",
            "Nurture leads with personalized, compelling communications",
            "Within the vibrant ecosystem of CrewAI's sales department, \
             you stand out as the bridge between potential clients \
             and the solutions they need. \
             By creating engaging, personalized messages, \
             you not only inform leads about our offerings \
             but also make them feel seen and heard. \
             Your role is pivotal in converting interest \
             into action, guiding leads through the journey \
             from curiosity to commitment.",
        ),
    ]
    .into_iter()
    .map(|worker| worker.allow_delegation(false).verbose(true))
    .collect()
}

pub fn build_tasks(workers: &[WorkerSpec]) -> Result<Vec<TaskSpec>, ContractError> {
    let tasks = vec![
        TaskSpec::new(
            "lead_profiling",
            "sales_rep_agent",
            "Conduct an in-depth analysis of {lead_name}, \
             a company in the {industry} sector \
             that recently showed interest in our solutions. \
             Utilize all available data sources \
             to compile a detailed profile, \
             focusing on key decision-makers, recent business \
             developments, and potential needs \
             that align with our offerings. \
             This task is crucial for tailoring \
             our engagement strategy effectively.\n\
             Don't make assumptions and \
             only use information you absolutely sure about.",
            "A comprehensive report on {lead_name}, \
             including company background, \
             key personnel, recent milestones, and identified needs. \
             Highlight potential areas where \
             our solutions can provide value, \
             and suggest personalized engagement strategies.",
        )
        .with_tools([
            ToolRef::directory(INSTRUCTIONS_DIR),
            ToolRef::file_read(),
            ToolRef::Search,
        ]),
        TaskSpec::new(
            "personalized_outreach",
            "lead_sales_rep_agent",
            "Using the insights gathered from \
             the lead profiling report on {lead_name}, \
             craft a personalized outreach campaign \
             aimed at {key_decision_maker}, \
             the {position} of {lead_name}. \
             The campaign should address their recent {milestone} \
             and how our solutions can support their goals. \
             Your communication must resonate \
             with {lead_name}'s company culture and values, \
             demonstrating a deep understanding of \
             their business and needs.\n\
             Don't make assumptions and only \
             use information you absolutely sure about.",
            "A series of personalized email drafts \
             tailored to {lead_name}, \
             specifically targeting {key_decision_maker}. \
             Each draft should include \
             a compelling narrative that connects our solutions \
             with their recent achievements and future goals. \
             Ensure the tone is engaging, professional, \
             and aligned with {lead_name}'s corporate identity.",
        )
        .depends_on(["lead_profiling"])
        .with_tools([ToolRef::custom(SENTIMENT_TOOL_NAME), ToolRef::Search]),
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
