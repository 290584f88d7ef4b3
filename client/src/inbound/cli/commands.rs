//! `consentctl` argument parsing and command dispatch.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use mockable::Clock;
use tracing::{debug, info};

use super::output::{SessionOutput, write_json};
use crate::domain::ports::{ConsentStore, CreatorQuery, CreatorSort, TemplateQuery, UserSearch};
use crate::domain::{
    AccessToken, ConsentDraft, ConsentId, ConsentService, CredentialsValidationError,
    DEFAULT_PAGE_LIMIT, DirectoryService, Error, LoginCredentials, NotificationPoller,
    PageRequest, Registration, Session, TemplateId, UserId, UserRole,
};

/// `consentctl` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "consentctl",
    about = "Manage marketplace consents, invitations and templates",
    version
)]
pub struct Cli {
    /// Marketplace API root. Overrides `CONSENT_CLIENT_API_BASE_URL`.
    #[arg(long = "api-base-url", value_name = "url", global = true)]
    pub api_base_url: Option<String>,
    /// Bearer token. Overrides `CONSENT_CLIENT_ACCESS_TOKEN`.
    #[arg(long = "token", value_name = "token", global = true)]
    pub token: Option<String>,
    /// Request timeout in seconds. Overrides `CONSENT_CLIENT_REQUEST_TIMEOUT_SECS`.
    #[arg(long = "timeout-secs", value_name = "seconds", global = true)]
    pub timeout_secs: Option<u64>,
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported operations.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sign in and print the session token.
    Login {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long)]
        password: String,
    },
    /// Create an account and print the session token.
    Register {
        /// Display name.
        #[arg(long)]
        name: String,
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long)]
        password: String,
        /// Marketplace role: artist, company or admin.
        #[arg(long, default_value = "artist")]
        role: UserRole,
    },
    /// Show the signed-in user.
    Whoami,
    /// Show the dashboard buckets.
    Dashboard,
    /// List invitations awaiting your answer.
    Invitations,
    /// List pending invitations you sent.
    Sent,
    /// Show one consent.
    Show {
        /// Consent identifier.
        id: String,
    },
    /// Create a consent and invite collaborators.
    Invite {
        /// Agreement title.
        #[arg(long)]
        title: String,
        /// Agreement description.
        #[arg(long)]
        description: String,
        /// Invited user ids, comma separated.
        #[arg(long = "with", value_name = "user-id", value_delimiter = ',', required = true)]
        involved_users: Vec<String>,
    },
    /// Sign a consent.
    Accept {
        /// Consent identifier.
        id: String,
    },
    /// Decline an invitation.
    Reject {
        /// Consent identifier.
        id: String,
    },
    /// Withdraw a pending invitation you created.
    Delete {
        /// Consent identifier.
        id: String,
    },
    /// Browse the template gallery.
    Templates {
        /// Only show this category.
        #[arg(long)]
        category: Option<String>,
        /// One-based page number.
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Page size.
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u32,
    },
    /// Start a consent from a template.
    Clone {
        /// Template identifier.
        template: String,
        /// Title of the new consent.
        #[arg(long)]
        title: String,
    },
    /// Browse creators.
    Creators {
        /// Only list this role.
        #[arg(long)]
        role: Option<UserRole>,
        /// Ordering: top_rated, newest or name.
        #[arg(long, default_value = "top_rated", value_parser = parse_sort)]
        sort: CreatorSort,
        /// One-based page number.
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Page size.
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u32,
    },
    /// Search users.
    Search {
        /// Search text.
        query: String,
        /// Only match this role.
        #[arg(long)]
        role: Option<UserRole>,
        /// Only match this industry.
        #[arg(long)]
        industry: Option<String>,
    },
    /// Show a user profile.
    Profile {
        /// User identifier.
        id: String,
    },
    /// Poll for new invitations and print each snapshot.
    Watch {
        /// Seconds between polls. Overrides `CONSENT_CLIENT_POLL_INTERVAL_SECS`.
        #[arg(long = "interval-secs", value_name = "seconds")]
        interval_secs: Option<u64>,
        /// Stop after this many snapshots; runs until interrupted otherwise.
        #[arg(long)]
        updates: Option<usize>,
    },
}

fn parse_sort(raw: &str) -> Result<CreatorSort, String> {
    match raw.trim() {
        "top_rated" => Ok(CreatorSort::TopRated),
        "newest" => Ok(CreatorSort::Newest),
        "name" => Ok(CreatorSort::Name),
        other => Err(format!(
            "unknown sort `{other}`; expected top_rated, newest or name"
        )),
    }
}

/// Services and credentials a command runs against.
pub struct CliContext {
    consents: ConsentService<dyn ConsentStore>,
    directory: DirectoryService,
    token: Option<AccessToken>,
    poll_interval: Duration,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl CliContext {
    /// Bundle services with the configured token and poll interval.
    pub fn new(
        consents: ConsentService<dyn ConsentStore>,
        directory: DirectoryService,
        token: Option<AccessToken>,
        poll_interval: Duration,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            consents,
            directory,
            token,
            poll_interval,
            clock,
        }
    }

    async fn session(&self) -> Result<Session, Error> {
        let token = self.token.clone().ok_or_else(|| {
            Error::unauthorized(
                "not signed in; run `consentctl login` and export CONSENT_CLIENT_ACCESS_TOKEN",
            )
        })?;
        self.directory.resume(token).await
    }

    async fn optional_session(&self) -> Result<Option<Session>, Error> {
        match self.token {
            Some(_) => self.session().await.map(Some),
            None => Ok(None),
        }
    }
}

fn consent_id(raw: &str) -> Result<ConsentId, Error> {
    ConsentId::new(raw.trim()).map_err(|error| Error::invalid_request(error.to_string()))
}

fn template_id(raw: &str) -> Result<TemplateId, Error> {
    TemplateId::new(raw.trim()).ok_or_else(|| Error::invalid_request("template id must not be blank"))
}

fn user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw.trim()).map_err(|error| Error::invalid_request(error.to_string()))
}

fn map_credentials_error(error: &CredentialsValidationError) -> Error {
    Error::invalid_request(error.to_string())
        .with_details(serde_json::json!({ "field": error.field() }))
}

/// Run `command`, writing JSON results to `out`.
///
/// # Errors
///
/// Returns the domain error reported by the failing operation.
pub async fn run(command: Command, ctx: &CliContext, out: &mut dyn Write) -> Result<(), Error> {
    match command {
        Command::Login { email, password } => {
            let credentials = LoginCredentials::try_from_parts(&email, &password)
                .map_err(|error| map_credentials_error(&error))?;
            let session = ctx.directory.login(&credentials).await?;
            write_json(out, &SessionOutput::from(&session))
        }
        Command::Register {
            name,
            email,
            password,
            role,
        } => {
            let registration = Registration::try_from_parts(&name, &email, &password, role)
                .map_err(|error| map_credentials_error(&error))?;
            let session = ctx.directory.register(&registration).await?;
            write_json(out, &SessionOutput::from(&session))
        }
        Command::Whoami => {
            let session = ctx.session().await?;
            write_json(out, session.user())
        }
        Command::Dashboard => {
            let session = ctx.session().await?;
            write_json(out, &ctx.consents.dashboard(&session).await?)
        }
        Command::Invitations => {
            let session = ctx.session().await?;
            write_json(out, &ctx.consents.pending_invitations(&session).await?)
        }
        Command::Sent => {
            let session = ctx.session().await?;
            write_json(out, &ctx.consents.sent_invitations(&session).await?)
        }
        Command::Show { id } => {
            let session = ctx.session().await?;
            write_json(out, &ctx.consents.get(&session, &consent_id(&id)?).await?)
        }
        Command::Invite {
            title,
            description,
            involved_users,
        } => {
            let session = ctx.session().await?;
            let draft = ConsentDraft {
                title,
                description,
                created_by: None,
                involved_users,
            };
            write_json(out, &ctx.consents.create(&session, draft).await?)
        }
        Command::Accept { id } => {
            let session = ctx.session().await?;
            write_json(out, &ctx.consents.accept(&session, &consent_id(&id)?).await?)
        }
        Command::Reject { id } => {
            let session = ctx.session().await?;
            let id = consent_id(&id)?;
            ctx.consents.reject(&session, &id).await?;
            write_json(out, &serde_json::json!({ "rejected": id }))
        }
        Command::Delete { id } => {
            let session = ctx.session().await?;
            let id = consent_id(&id)?;
            ctx.consents.delete(&session, &id).await?;
            write_json(out, &serde_json::json!({ "deleted": id }))
        }
        Command::Templates {
            category,
            page,
            limit,
        } => {
            let session = ctx.optional_session().await?;
            let query = TemplateQuery {
                category,
                page: PageRequest::new(page, limit),
            };
            write_json(out, &ctx.directory.templates(session.as_ref(), &query).await?)
        }
        Command::Clone { template, title } => {
            let session = ctx.session().await?;
            let cloned = ctx
                .consents
                .clone_template(
                    ctx.directory.catalogue(),
                    &session,
                    &template_id(&template)?,
                    &title,
                )
                .await?;
            write_json(out, &cloned)
        }
        Command::Creators {
            role,
            sort,
            page,
            limit,
        } => {
            let session = ctx.optional_session().await?;
            let query = CreatorQuery {
                role,
                sort,
                page: PageRequest::new(page, limit),
            };
            write_json(out, &ctx.directory.creators(session.as_ref(), &query).await?)
        }
        Command::Search {
            query,
            role,
            industry,
        } => {
            let session = ctx.optional_session().await?;
            let search = UserSearch {
                query,
                role,
                industry,
            };
            write_json(out, &ctx.directory.search(session.as_ref(), &search).await?)
        }
        Command::Profile { id } => {
            let session = ctx.optional_session().await?;
            write_json(out, &ctx.directory.profile(session.as_ref(), &user_id(&id)?).await?)
        }
        Command::Watch {
            interval_secs,
            updates,
        } => {
            let session = ctx.session().await?;
            let interval = interval_secs
                .filter(|secs| *secs > 0)
                .map_or(ctx.poll_interval, Duration::from_secs);
            watch(ctx, session, interval, updates, out).await
        }
    }
}

async fn watch(
    ctx: &CliContext,
    session: Session,
    interval: Duration,
    updates: Option<usize>,
    out: &mut dyn Write,
) -> Result<(), Error> {
    info!(user_id = %session.user_id(), interval_secs = interval.as_secs(), "watching invitations");
    let handle = NotificationPoller::new(ctx.consents.clone(), session, Arc::clone(&ctx.clock))
        .with_interval(interval)
        .spawn();
    let mut snapshots = handle.subscribe();
    let mut printed = 0_usize;

    while updates.is_none_or(|limit| printed < limit) {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                debug!(pending = snapshot.count(), "invitation snapshot received");
                write_json(out, &snapshot)?;
                printed += 1;
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupt received");
                break;
            }
        }
    }

    handle.cancel().await;
    Ok(())
}
