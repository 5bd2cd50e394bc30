//! Research and write an article
//!
//! Four workers in a strict chain: research -> plan -> write -> edit.

use contracts::{ContractError, CrewBlueprint, CrewSettings, ParameterSpec, TaskSpec, WorkerSpec};

use crate::{assemble_blueprint, check_tasks};

pub const NAME: &str = "article";

pub fn parameters() -> Vec<ParameterSpec> {
    vec![ParameterSpec::with_default("topic", "Artificial Intelligence")
        .describe("Subject of the blog article")]
}

pub fn build_workers() -> Vec<WorkerSpec> {
    vec![
        WorkerSpec::new(
            "researcher",
            "Research Analyst",
            "Gather the latest trends, key players and reliable sources on {topic}",
            "You're collecting background material for a blog article \
             about the topic: {topic}. \
             You separate established facts from speculation and note \
             where every piece of information comes from. \
             Your findings are the basis for the Content Planner's outline.",
        ),
        WorkerSpec::new(
            "planner",
            "Content Planner",
            "Plan engaging and factually accurate content on {topic}",
            "You're working on planning a blog article \
             about the topic: {topic}. \
             You collect information that helps the \
             audience learn something \
             and make informed decisions. \
             Your work is the basis for \
             the Content Writer to write an article on this topic.",
        ),
        WorkerSpec::new(
            "writer",
            "Content Writer",
            "Write insightful and factually accurate \
             opinion piece about the topic: {topic}",
            "You're working on a writing \
             a new opinion piece about the topic: {topic}. \
             You base your writing on the work of \
             the Content Planner, who provides an outline \
             and relevant context about the topic. \
             You follow the main objectives and \
             direction of the outline, \
             as provide by the Content Planner. \
             You also provide objective and impartial insights \
             and back them up with information \
             provide by the Content Planner. \
             You acknowledge in your opinion piece \
             when your statements are opinions \
             as opposed to objective statements.",
        ),
        WorkerSpec::new(
            "editor",
            "Editor",
            "Edit a given blog post to align with \
             the writing style of the organization.",
            "You are an editor who receives a blog post \
             from the Content Writer. \
             Your goal is to review the blog post \
             to ensure that it follows journalistic best practices, \
             provides balanced viewpoints \
             when providing opinions or assertions, \
             and also avoids major controversial topics \
             or opinions when possible.",
        ),
    ]
    .into_iter()
    .map(|worker| worker.allow_delegation(false).verbose(true))
    .collect()
}

pub fn build_tasks(workers: &[WorkerSpec]) -> Result<Vec<TaskSpec>, ContractError> {
    let tasks = vec![
        TaskSpec::new(
            "research",
            "researcher",
            "1. Collect the latest trends, key players, \
             and noteworthy news on {topic}.\n\
             2. Note the sources for every finding.\n\
             3. Flag open questions and conflicting claims.",
            "A research brief with key findings, \
             notable players and a list of sources.",
        ),
        TaskSpec::new(
            "plan",
            "planner",
            "1. Prioritize the latest trends, key players, \
             and noteworthy news on {topic}.\n\
             2. Identify the target audience, considering \
             their interests and pain points.\n\
             3. Develop a detailed content outline including \
             an introduction, key points, and a call to action.\n\
             4. Include SEO keywords and relevant data or sources.",
            "A comprehensive content plan document \
             with an outline, audience analysis, \
             SEO keywords, and resources.",
        )
        .depends_on(["research"]),
        TaskSpec::new(
            "write",
            "writer",
            "1. Use the content plan to craft a compelling \
             blog post on {topic}.\n\
             2. Incorporate SEO keywords naturally.\n\
             3. Sections/Subtitles are properly named \
             in an engaging manner.\n\
             4. Ensure the post is structured with an \
             engaging introduction, insightful body, \
             and a summarizing conclusion.\n\
             5. Proofread for grammatical errors and \
             alignment with the brand's voice.\n",
            "A well-written blog post \
             in markdown format, ready for publication, \
             each section should have 2 or 3 paragraphs.",
        )
        .depends_on(["plan"]),
        TaskSpec::new(
            "edit",
            "editor",
            "Proofread the given blog post for \
             grammatical errors and \
             alignment with the brand's voice.",
            "A well-written blog post in markdown format, \
             ready for publication, \
             each section should have 2 or 3 paragraphs.",
        )
        .depends_on(["write"]),
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
