use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "tameny", version, about = "Tameny Parenting Assistant", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the push-relay HTTP service
    Relay,

    /// Enter the interactive medical-consultation chat
    Chat,

    /// Manage child profiles
    Children {
        #[command(subcommand)]
        action: ChildAction,
    },

    /// Vaccination and milestone checklists
    Growth {
        #[command(subcommand)]
        action: GrowthAction,
    },

    /// List and complete reminders
    Reminders {
        #[command(subcommand)]
        action: ReminderAction,
    },

    /// Send a notification to every registered account (admin)
    Broadcast {
        /// Notification title
        #[arg(short, long)]
        title: String,

        /// Notification body
        #[arg(short, long)]
        message: String,
    },
}

#[derive(Subcommand)]
pub enum ChildAction {
    /// List your children
    List,

    /// Add a child profile
    Add {
        #[arg(short, long)]
        name: String,

        /// Date of birth, YYYY-MM-DD
        #[arg(long)]
        date_of_birth: Option<NaiveDate>,

        /// male or female
        #[arg(long)]
        gender: Option<String>,

        /// One of A+ A- B+ B- AB+ AB- O+ O-
        #[arg(long)]
        blood_type: Option<String>,

        /// Comma-separated allergy list
        #[arg(long)]
        allergies: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a child profile (asks for confirmation)
    Remove { id: Uuid },
}

#[derive(Subcommand)]
pub enum GrowthAction {
    /// Show both checklists for a child (defaults to the first child)
    Status {
        #[arg(short, long)]
        child: Option<Uuid>,
    },

    /// Toggle a vaccination by its exact schedule name
    Vaccine {
        #[arg(short, long)]
        child: Option<Uuid>,

        name: String,
    },

    /// Toggle a milestone by age range, category and item index
    Milestone {
        #[arg(short, long)]
        child: Option<Uuid>,

        /// e.g. "4-6 months"
        age_range: String,

        /// physical or social
        category: String,

        /// Zero-based index within the category's list
        index: usize,
    },
}

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Current and overdue reminders, plus history
    List,

    /// Mark a reminder as completed
    Done { id: Uuid },
}
