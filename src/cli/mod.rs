pub mod commands;

use std::io::{self, Write};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::client::PlatformAuth;
use crate::auth::{AuthError, AuthHolder, Identity};
use crate::chat::ChatCoordinator;
use crate::children::{ChildForm, ChildService};
use crate::cli::commands::{ChildAction, Commands, GrowthAction, ReminderAction};
use crate::config::AppConfig;
use crate::growth::{milestone_key, GrowthTracker, MilestoneCategory, MILESTONES, VACCINATION_SCHEDULE};
use crate::notify::AdminBroadcast;
use crate::profile::ProfileService;
use crate::reminders::{status, ReminderList, ReminderStatus};
use crate::remote::stores::PlatformStore;
use crate::remote::RemoteClient;
use crate::routing::{self, RouteDecision};
use crate::schema::{BloodType, Gender, MessageRole};

pub async fn run_cli(command: Commands, config_path: String) {
    let config = AppConfig::load(&config_path).expect("Failed to load config");

    match command {
        Commands::Relay => {
            panic!("Relay command should be intercepted by main.rs to boot the relay");
        }
        Commands::Chat => {
            let Some(session) = sign_in(&config).await else { return };

            match routing::evaluate(&session.holder.snapshot(), "/chat") {
                RouteDecision::Allow => run_repl(session).await,
                RouteDecision::RedirectToOnboarding => {
                    println!("Add your first child before starting a consultation:");
                    println!("  tameny children add --name <name>");
                }
                other => println!("Cannot open the consultation screen: {:?}", other),
            }
        }
        Commands::Children { action } => {
            let Some(session) = sign_in(&config).await else { return };
            run_children(session, action).await;
        }
        Commands::Growth { action } => {
            let Some(session) = sign_in(&config).await else { return };

            match routing::evaluate(&session.holder.snapshot(), "/growth") {
                RouteDecision::Allow => run_growth(session, action).await,
                RouteDecision::RedirectToOnboarding => {
                    println!("Add a child first to track growth.");
                }
                other => println!("Cannot open the growth screen: {:?}", other),
            }
        }
        Commands::Reminders { action } => {
            let Some(session) = sign_in(&config).await else { return };
            run_reminders(session, action).await;
        }
        Commands::Broadcast { title, message } => {
            let Some(session) = sign_in(&config).await else { return };

            let broadcast =
                AdminBroadcast::new(session.store.clone(), session.store.clone());
            match broadcast.send_to_all(&title, &message).await {
                Ok(report) if report.push_delivered => {
                    println!("Notification sent to {} users.", report.recipients);
                }
                Ok(report) => {
                    println!(
                        "Saved {} notifications, but push delivery failed.",
                        report.recipients
                    );
                }
                Err(e) => eprintln!("Error: {}", e),
            }
        }
    }
}

struct CliSession {
    holder: AuthHolder,
    identity: Identity,
    store: Arc<PlatformStore>,
}

/// Sign in through the auth state holder before any screen opens. Reads
/// TAMENY_EMAIL / TAMENY_PASSWORD, prompting for whichever is missing.
async fn sign_in(config: &AppConfig) -> Option<CliSession> {
    let client = Arc::new(RemoteClient::new(&config.remote));
    let store = Arc::new(PlatformStore::new(client.clone()));
    let api = Arc::new(PlatformAuth::new(client));
    let holder = AuthHolder::new(api, store.clone());
    holder.initialize().await;

    let email = credential("TAMENY_EMAIL", "Email");
    let password = credential("TAMENY_PASSWORD", "Password");

    match holder.sign_in(&email, &password).await {
        Ok(identity) => Some(CliSession {
            holder,
            identity,
            store,
        }),
        Err(AuthError::InvalidCredentials) => {
            eprintln!("Email or password is incorrect.");
            None
        }
        Err(e) => {
            eprintln!("Sign-in failed: {}", e);
            None
        }
    }
}

fn credential(var: &str, label: &str) -> String {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => value,
        _ => prompt(&format!("{}> ", label)),
    }
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    io::stdout().flush().unwrap();
    let mut input = String::new();
    io::stdin().read_line(&mut input).unwrap();
    input.trim().to_string()
}

fn print_transcript(chat: &ChatCoordinator) {
    for entry in chat.entries() {
        let speaker = match entry.role {
            MessageRole::User => "You",
            MessageRole::Assistant => "Tameny",
        };
        println!("{}> {}", speaker, entry.content);
    }
}

async fn run_repl(session: CliSession) {
    let mut chat = ChatCoordinator::new(
        session.store.clone(),
        session.store.clone(),
        Some(session.identity.id),
    );

    if let Err(e) = chat.load_sessions().await {
        eprintln!("Could not load your consultations: {}", e);
    }

    println!("--- Tameny Medical Consultation ---");
    println!("Session: {}", chat.current_title());
    println!("Commands: /new, /sessions, /switch <n>, /exit");
    println!("-----------------------------------");
    print_transcript(&chat);

    loop {
        let input = prompt("\nYou> ");
        let text = input.trim();

        if text.is_empty() {
            continue;
        }
        if text == "/exit" || text == "/quit" {
            break;
        }
        if text == "/new" {
            chat.start_new_chat();
            println!("Started a new consultation.");
            print_transcript(&chat);
            continue;
        }
        if text == "/sessions" {
            if chat.sessions().is_empty() {
                println!("No saved consultations.");
            } else {
                for (n, s) in chat.sessions().iter().enumerate() {
                    let marker = if Some(s.id) == chat.active_session() {
                        "*"
                    } else {
                        " "
                    };
                    println!(
                        "{} {:>2}. {}",
                        marker,
                        n + 1,
                        s.name.as_deref().unwrap_or(crate::chat::UNTITLED_SESSION)
                    );
                }
            }
            continue;
        }
        if let Some(n) = text.strip_prefix("/switch ") {
            let Some(selected) = n
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|n| chat.sessions().get(n))
                .map(|s| s.id)
            else {
                println!("Unknown session number.");
                continue;
            };
            match chat.select_session(selected).await {
                Ok(()) => print_transcript(&chat),
                Err(e) => eprintln!("Error: {}", e),
            }
            continue;
        }

        match chat.send_message(text).await {
            Ok(()) => {
                if let Some(reply) = chat.entries().last() {
                    println!("Tameny> {}", reply.content);
                }
            }
            Err(e) => eprintln!("{}", e),
        }
    }
}

async fn run_children(session: CliSession, action: ChildAction) {
    let service = ChildService::new(session.store.clone());

    // The profile row is created lazily the first time this screen opens.
    if let Err(e) = ProfileService::new(session.store.clone())
        .ensure(&session.identity)
        .await
    {
        eprintln!("Could not load your profile: {}", e);
    }

    match action {
        ChildAction::List => match service.list(session.identity.id).await {
            Ok(children) if children.is_empty() => println!("No children yet."),
            Ok(children) => {
                println!("{:<38} | {:<12} | {}", "ID", "Born", "Name");
                println!("{:-<38}-+-{:-<12}-+-{:-<20}", "", "", "");
                for child in children {
                    let born = child
                        .date_of_birth
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!("{:<38} | {:<12} | {}", child.id, born, child.name);
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        },
        ChildAction::Add {
            name,
            date_of_birth,
            gender,
            blood_type,
            allergies,
            notes,
        } => {
            let form = ChildForm {
                name,
                date_of_birth,
                gender: gender.as_deref().and_then(parse_gender),
                blood_type: blood_type.as_deref().and_then(parse_blood_type),
                allergies: allergies.unwrap_or_default(),
                medical_notes: notes.unwrap_or_default(),
            };
            match service.create(session.identity.id, form).await {
                Ok(()) => {
                    println!("Child added.");
                    // The onboarding flag may have just flipped.
                    session.holder.refresh_children().await;
                }
                Err(e) => eprintln!("Error: {}", e),
            }
        }
        ChildAction::Remove { id } => {
            let confirm = prompt("Deleting a child cannot be undone. Type 'yes' to confirm> ");
            if confirm != "yes" {
                println!("Cancelled.");
                return;
            }
            match service.delete(id).await {
                Ok(()) => {
                    println!("Child deleted.");
                    session.holder.refresh_children().await;
                }
                Err(e) => eprintln!("Error: {}", e),
            }
        }
    }
}

/// Default to the first child when none was passed, like the growth screen's
/// selector does.
async fn resolve_child(session: &CliSession, child: Option<Uuid>) -> Option<Uuid> {
    if child.is_some() {
        return child;
    }
    let service = ChildService::new(session.store.clone());
    match service.list(session.identity.id).await {
        Ok(children) => children.first().map(|c| c.id),
        Err(e) => {
            eprintln!("Error: {}", e);
            None
        }
    }
}

async fn run_growth(session: CliSession, action: GrowthAction) {
    let mut tracker = GrowthTracker::new(session.store.clone());

    let child = match action {
        GrowthAction::Status { child }
        | GrowthAction::Vaccine { child, .. }
        | GrowthAction::Milestone { child, .. } => child,
    };
    let Some(child) = resolve_child(&session, child).await else {
        println!("Please add a child first to track growth.");
        return;
    };

    if let Err(e) = tracker.select_child(Some(child)).await {
        eprintln!("Error: {}", e);
        return;
    }

    match action {
        GrowthAction::Status { .. } => {
            println!("Vaccinations");
            for group in VACCINATION_SCHEDULE {
                println!("  {}", group.age);
                for vaccine in group.vaccines {
                    let mark = if tracker.is_vaccine_completed(vaccine) {
                        "[x]"
                    } else {
                        "[ ]"
                    };
                    println!("    {} {}", mark, vaccine);
                }
            }
            println!("\nMilestones");
            for group in MILESTONES {
                println!("  {}", group.age_range);
                for category in [MilestoneCategory::Physical, MilestoneCategory::Social] {
                    for (index, item) in group.items(category).iter().enumerate() {
                        let key = milestone_key(group.age_range, category, index);
                        let mark = if tracker.is_milestone_achieved(&key) {
                            "[x]"
                        } else {
                            "[ ]"
                        };
                        println!("    {} ({}) {}", mark, category.as_str(), item);
                    }
                }
            }
        }
        GrowthAction::Vaccine { name, .. } => {
            let known = VACCINATION_SCHEDULE
                .iter()
                .any(|g| g.vaccines.contains(&name.as_str()));
            if !known {
                println!("'{}' is not in the vaccination schedule.", name);
                return;
            }
            match tracker.toggle_vaccine(&name).await {
                Ok(outcome) => println!("{}", toggle_message(outcome, "vaccination")),
                Err(e) => eprintln!("{}", e),
            }
        }
        GrowthAction::Milestone {
            age_range,
            category,
            index,
            ..
        } => {
            let Some(category) = parse_category(&category) else {
                println!("Category must be 'physical' or 'social'.");
                return;
            };
            let Some(description) = MILESTONES
                .iter()
                .find(|g| g.age_range == age_range)
                .and_then(|g| g.items(category).get(index).copied())
            else {
                println!("No such milestone in the schedule.");
                return;
            };
            match tracker
                .toggle_milestone(&age_range, category, index, description)
                .await
            {
                Ok(outcome) => println!("{}", toggle_message(outcome, "milestone")),
                Err(e) => eprintln!("{}", e),
            }
        }
    }
}

fn toggle_message(outcome: crate::growth::ToggleOutcome, what: &str) -> String {
    match outcome {
        crate::growth::ToggleOutcome::Recorded => format!("The {} was recorded.", what),
        crate::growth::ToggleOutcome::Cleared => format!("The {} was unchecked.", what),
    }
}

async fn run_reminders(session: CliSession, action: ReminderAction) {
    let mut list = ReminderList::new(session.store.clone());

    match action {
        ReminderAction::List => {
            if let Err(e) = list.refresh().await {
                eprintln!("Could not fetch reminders: {}", e);
                return;
            }
            let now = chrono::Utc::now();
            let active = list.active();
            if active.is_empty() {
                println!("No current reminders. Well done!");
            } else {
                println!("Current ({})", active.len());
                for reminder in active {
                    let overdue = if status(reminder, now) == ReminderStatus::Overdue {
                        " (overdue)"
                    } else {
                        ""
                    };
                    println!(
                        "  {} | due {}{} | {}",
                        reminder.id, reminder.due_date, overdue, reminder.title
                    );
                }
            }
            let completed = list.completed();
            if !completed.is_empty() {
                println!("History");
                for reminder in completed {
                    println!("  {} | {}", reminder.due_date, reminder.title);
                }
            }
        }
        ReminderAction::Done { id } => match list.mark_complete(id).await {
            Ok(()) => println!("Reminder completed."),
            Err(e) => eprintln!("Error: {}", e),
        },
    }
}

fn parse_gender(value: &str) -> Option<Gender> {
    match value.to_lowercase().as_str() {
        "male" => Some(Gender::Male),
        "female" => Some(Gender::Female),
        _ => None,
    }
}

fn parse_blood_type(value: &str) -> Option<BloodType> {
    match value.to_uppercase().as_str() {
        "A+" => Some(BloodType::APos),
        "A-" => Some(BloodType::ANeg),
        "B+" => Some(BloodType::BPos),
        "B-" => Some(BloodType::BNeg),
        "AB+" => Some(BloodType::AbPos),
        "AB-" => Some(BloodType::AbNeg),
        "O+" => Some(BloodType::OPos),
        "O-" => Some(BloodType::ONeg),
        _ => None,
    }
}

fn parse_category(value: &str) -> Option<MilestoneCategory> {
    match value.to_lowercase().as_str() {
        "physical" => Some(MilestoneCategory::Physical),
        "social" => Some(MilestoneCategory::Social),
        _ => None,
    }
}
