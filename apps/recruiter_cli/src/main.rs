mod config;
mod credential_store;

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ClientError, Credential, HttpBackend, JobBoard, JobDraft, JobPatch, JobRoster, ProfilePatch,
    RecruiterController, RosterEntry, ViewError,
};
use shared::domain::{
    Application, ApplicationKey, ApplicationStatus, Job, JobId, Profile, ProfileId, SalaryRange,
    Skill,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

#[derive(Parser, Debug)]
#[command(name = "recruiter", about = "CyberHire job board and applicant review client")]
struct Cli {
    /// Settings file; defaults to ./recruiter.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    SignIn {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    SignUp {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        recruiter: bool,
    },
    SignOut,
    /// Jobs posted by the signed-in recruiter.
    Jobs,
    /// Every job on the board.
    Board,
    Job {
        job_id: i64,
    },
    Skills,
    /// Jobs matched to the signed-in applicant's skills.
    Matches,
    Profile,
    EditProfile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Replaces the signed-in user's profile skills.
    SetSkills {
        #[arg(long = "skill")]
        skills: Vec<String>,
    },
    PostJob {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        company: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long)]
        min_salary: Option<i64>,
        #[arg(long)]
        max_salary: Option<i64>,
        #[arg(long = "skill")]
        skills: Vec<String>,
    },
    EditJob {
        job_id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        min_salary: Option<i64>,
        #[arg(long)]
        max_salary: Option<i64>,
        /// Replaces the job's skills when given at least once.
        #[arg(long = "skill")]
        skills: Vec<String>,
    },
    DeleteJob {
        job_id: i64,
    },
    Apply {
        job_id: i64,
    },
    Withdraw {
        job_id: i64,
    },
    /// The signed-in applicant's own applications.
    Applications {
        #[arg(long)]
        status: Option<ApplicationStatus>,
    },
    /// Every applicant across the recruiter's jobs.
    Applicants {
        #[arg(long)]
        filter: Option<String>,
    },
    SetStatus {
        job_id: i64,
        profile_id: i64,
        status: ApplicationStatus,
        #[arg(long)]
        feedback: Option<String>,
    },
    Resume {
        profile_id: i64,
        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let mut settings = config::load_settings(cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        settings.api_base_url = config::normalize_api_base_url(url)?;
    }

    match run(cli.command, &settings).await {
        Err(err) if requires_sign_in(&err) => {
            if credential_store::clear(&settings.credential_path)? {
                info!(path = %settings.credential_path.display(), "cli: cleared rejected credential");
            }
            Err(err.context("the backend rejected the stored credential; run `recruiter sign-in` again"))
        }
        other => other,
    }
}

fn requires_sign_in(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ClientError>().is_some_and(ClientError::is_auth)
        || err.downcast_ref::<ViewError>().is_some_and(ViewError::requires_reauth)
}

fn require_credential(settings: &Settings) -> Result<Credential> {
    credential_store::load(&settings.credential_path)?
        .context("not signed in; run `recruiter sign-in` first")
}

async fn run(command: Command, settings: &Settings) -> Result<()> {
    let backend = HttpBackend::with_timeout(&settings.api_base_url, Some(settings.request_timeout()))?;
    let board = JobBoard::new(backend.clone());

    match command {
        Command::SignIn { username, password } => {
            let credential = board.sign_in(&username, &password).await?;
            credential_store::save(&settings.credential_path, &credential)?;
            println!("Signed in as {username}");
        }
        Command::SignUp {
            username,
            email,
            password,
            recruiter,
        } => {
            let user = board.sign_up(&username, &email, &password, recruiter).await?;
            let role = if user.is_recruiter { "recruiter" } else { "applicant" };
            println!("Created {role} account {} (id {})", user.username, user.id);
        }
        Command::SignOut => {
            if credential_store::clear(&settings.credential_path)? {
                println!("Signed out");
            } else {
                println!("Not signed in");
            }
        }
        Command::Jobs => {
            let credential = require_credential(settings)?;
            let jobs = JobRoster::new(&backend).owned_jobs(&credential).await?;
            print_jobs(&jobs);
        }
        Command::Board => print_jobs(&board.list_jobs().await?),
        Command::Job { job_id } => {
            let job = board.get_job(JobId(job_id)).await?;
            println!("{}", format_job(&job));
            println!(
                "posted by {} {} at {}",
                job.owner.first_name, job.owner.last_name, job.owner.company_name
            );
            if !job.description.is_empty() {
                println!("\n{}", job.description);
            }
        }
        Command::Skills => {
            for skill in board.list_skills().await? {
                println!("{:>4}  {}", skill.id.0, skill.label);
            }
        }
        Command::Matches => {
            let credential = require_credential(settings)?;
            print_jobs(&board.matched_jobs(&credential).await?);
        }
        Command::Profile => {
            let credential = require_credential(settings)?;
            println!("{}", format_profile(&board.my_profile(&credential).await?));
        }
        Command::EditProfile {
            first_name,
            last_name,
        } => {
            let credential = require_credential(settings)?;
            let patch = ProfilePatch {
                first_name,
                last_name,
            };
            let profile = board.update_profile(&patch, &credential).await?;
            println!("Updated {}", format_profile(&profile));
        }
        Command::SetSkills { skills } => {
            let credential = require_credential(settings)?;
            let profile = board.replace_my_skills(&skills, &credential).await?;
            println!("Updated {}", format_profile(&profile));
        }
        Command::PostJob {
            title,
            description,
            company,
            location,
            min_salary,
            max_salary,
            skills,
        } => {
            let credential = require_credential(settings)?;
            let draft = JobDraft {
                title,
                description,
                company_name: company,
                location,
                min_salary,
                max_salary,
                skills,
            };
            let job = board.create_job(&draft, &credential).await?;
            println!("Posted job {}", format_job(&job));
        }
        Command::EditJob {
            job_id,
            title,
            description,
            company,
            location,
            min_salary,
            max_salary,
            skills,
        } => {
            let credential = require_credential(settings)?;
            let patch = JobPatch {
                title,
                description,
                company_name: company,
                location,
                salary: salary_from_args(min_salary, max_salary)?,
                skills: (!skills.is_empty()).then_some(skills),
            };
            let job = board.update_job(JobId(job_id), &patch, &credential).await?;
            println!("Updated job {}", format_job(&job));
        }
        Command::DeleteJob { job_id } => {
            let credential = require_credential(settings)?;
            board.delete_job(JobId(job_id), &credential).await?;
            println!("Deleted job {job_id}");
        }
        Command::Apply { job_id } => {
            let credential = require_credential(settings)?;
            let application = board.apply(JobId(job_id), &credential).await?;
            println!("Applied: {}", format_application(&application));
        }
        Command::Withdraw { job_id } => {
            let credential = require_credential(settings)?;
            board.withdraw(JobId(job_id), &credential).await?;
            println!("Withdrew application for job {job_id}");
        }
        Command::Applications { status } => {
            let credential = require_credential(settings)?;
            let applications = board.my_applications(status, &credential).await?;
            if applications.is_empty() {
                println!("No applications");
            }
            for application in &applications {
                println!("{}", format_application(application));
            }
        }
        Command::Applicants { filter } => {
            let controller = controller(backend, settings)?;
            controller.refresh().await?;
            let mut view = controller.view().lock().await;
            view.set_filter(filter.unwrap_or_default());
            for degraded in view.degraded() {
                eprintln!("warning: job {} skipped: {}", degraded.job_id, degraded.message);
            }
            let visible = view.visible();
            if visible.is_empty() {
                println!("No applicants");
            }
            for entry in visible {
                println!("{}", format_entry(entry));
            }
        }
        Command::SetStatus {
            job_id,
            profile_id,
            status,
            feedback,
        } => {
            let controller = controller(backend, settings)?;
            let key = ApplicationKey::new(JobId(job_id), ProfileId(profile_id));
            controller
                .submit_status(key, status, feedback.as_deref())
                .await?;
            let view = controller.view().lock().await;
            match view.roster().iter().find(|entry| entry.key() == key) {
                Some(entry) => println!("Updated {}", format_entry(entry)),
                None => println!("Updated application {key}"),
            }
        }
        Command::Resume { profile_id, out } => {
            let controller = controller(backend, settings)?;
            let url = controller.open_resume(ProfileId(profile_id)).await?;
            let blob = controller
                .registry()
                .resolve(url.as_str())
                .context("resume was released before it could be saved")?;
            std::fs::write(&out, &blob.bytes)
                .with_context(|| format!("failed to write resume to '{}'", out.display()))?;
            controller.close_resume().await;
            println!("Saved resume ({} bytes) to {}", blob.len(), out.display());
        }
    }
    Ok(())
}

fn controller(backend: HttpBackend, settings: &Settings) -> Result<RecruiterController> {
    let credential = require_credential(settings)?;
    Ok(RecruiterController::new(Arc::new(backend), credential).with_placeholder(settings.default_picture.clone()))
}

fn salary_from_args(min: Option<i64>, max: Option<i64>) -> Result<Option<SalaryRange>> {
    match (min, max) {
        (None, None) => Ok(None),
        (Some(min), Some(max)) => Ok(Some(SalaryRange { min, max })),
        _ => bail!("--min-salary and --max-salary must be given together"),
    }
}

fn format_salary(salary: Option<SalaryRange>) -> String {
    match salary {
        Some(range) => format!("${}-${}", range.min, range.max),
        None => "salary not listed".to_string(),
    }
}

fn format_job(job: &Job) -> String {
    let mut line = format!(
        "#{} {} [{}] {}",
        job.id,
        job.title,
        job.location,
        format_salary(job.salary)
    );
    if !job.skills.is_empty() {
        line.push_str(&format!(" skills: {}", skill_list(&job.skills)));
    }
    line
}

fn print_jobs(jobs: &[Job]) {
    if jobs.is_empty() {
        println!("No jobs");
    }
    for job in jobs {
        println!("{}", format_job(job));
    }
}

fn skill_list(skills: &[Skill]) -> String {
    let labels: Vec<&str> = skills.iter().map(|skill| skill.label.as_str()).collect();
    labels.join(", ")
}

fn format_profile(profile: &Profile) -> String {
    let mut line = format!(
        "profile {} {} {}",
        profile.profile_id, profile.first_name, profile.last_name
    );
    if !profile.skills.is_empty() {
        line.push_str(&format!(" skills: {}", skill_list(&profile.skills)));
    }
    line
}

fn format_application(application: &Application) -> String {
    let mut line = format!(
        "{} {} ({}) {}",
        application.key,
        application.job_title,
        application.applicant.full_name(),
        application.status.as_str()
    );
    if let Some(feedback) = &application.feedback {
        line.push_str(&format!(" feedback: {feedback}"));
    }
    line
}

fn format_entry(entry: &RosterEntry) -> String {
    format!(
        "{} picture: {}",
        format_application(&entry.application),
        entry.picture.as_str()
    )
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
