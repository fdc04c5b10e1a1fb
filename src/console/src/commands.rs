use std::{
    fmt::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, bail, Result};
use auth::{settle, token, AuthState, Navigation, Session};
use managers::{FieldKind, Level, Notification, Screen};
use pages::{
    dashboard,
    devices::{DeviceFilter, DevicesPage, OnlineFilter, StatusFilter},
    screen_for, sidebar,
    subscriptions::{format_usd, SubscriptionsPage},
};
use types::{resource::ResourceKind, subscription::SubscriptionStatus, Id};

use crate::cli::{parse_assignment, Command};

pub struct Console {
    session: Session,
    token_file: PathBuf,
}

fn describe(navigation: &Navigation) -> String {
    match navigation {
        Navigation::Render(route) => format!("render {:?}", route),
        Navigation::Loading => "loading".to_owned(),
        Navigation::Redirect(to) => format!("redirect {}", to),
        Navigation::NotFound => "not found".to_owned(),
    }
}

fn push_toasts(out: &mut String, toasts: &[Notification]) {
    for toast in toasts {
        let tag = match toast.level {
            Level::Success => "ok",
            Level::Error => "error",
        };
        let _ = writeln!(out, "[{}] {}", tag, toast.description);
    }
}

impl Console {
    pub fn new(session: Session, token_file: impl AsRef<Path>) -> Self {
        Self {
            session,
            token_file: token_file.as_ref().to_path_buf(),
        }
    }

    pub async fn run(&self, command: Command) -> Result<String> {
        match command {
            Command::Login { username, password } => self.login(&username, &password).await,
            Command::Logout => self.logout().await,
            Command::Whoami => self.whoami().await,
            Command::Route { path } => self.route(&path).await,
            Command::List {
                resource,
                search,
                status,
                online,
            } => {
                self.list(&resource, &search, status.as_deref(), online.as_deref())
                    .await
            }
            Command::Create { resource, set } => self.save(&resource, None, &set).await,
            Command::Update { resource, id, set } => self.save(&resource, Some(id), &set).await,
            Command::Delete { resource, id, yes } => self.delete(&resource, id, yes).await,
            Command::Toggle { resource, id } => self.toggle(&resource, id).await,
            Command::Dashboard => self.dashboard().await,
            Command::Nav { path } => Ok(sidebar::render(&sidebar::admin_nav(), &path)),
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<String> {
        let user = self.session.login(username, password).await?;
        if let Some(tokens) = self.session.tokens().await {
            token::save(&self.token_file, &tokens)?;
        }
        Ok(format!("logged in as {} ({})", user.username, user.role))
    }

    async fn logout(&self) -> Result<String> {
        self.session.logout().await;
        token::clear(&self.token_file)?;
        Ok("logged out".to_owned())
    }

    async fn whoami(&self) -> Result<String> {
        Ok(match self.resolve().await? {
            AuthState::Authenticated(user) => {
                let name = user.full_name();
                if name.is_empty() {
                    format!("{} ({})", user.username, user.role)
                } else {
                    format!("{} <{}> ({})", name, user.email, user.role)
                }
            }
            _ => "not logged in".to_owned(),
        })
    }

    async fn route(&self, path: &str) -> Result<String> {
        let state = self.resolve().await?;
        let (landed, navigation) = settle(path, &state);
        Ok(format!("{} -> {} ({})", path, landed, describe(&navigation)))
    }

    /// Restores the session; a token the session dropped is removed from
    /// disk too.
    async fn resolve(&self) -> Result<AuthState> {
        let state = self.session.resolve().await;
        if self.session.tokens().await.is_none() {
            token::clear(&self.token_file)?;
        }
        Ok(state)
    }

    /// Runs the route gate for `path`.
    async fn gate(&self, path: &str) -> Result<()> {
        let state = self.resolve().await?;
        if let Navigation::Render(_) = auth::resolve(path, &state) {
            return Ok(());
        }
        match settle(path, &state) {
            (landed, _) if landed == "/login" => bail!("not logged in, run `kuku login` first"),
            (landed, _) => bail!("{} is not available here (sent to {})", path, landed),
        }
    }

    async fn admin_screen(&self, resource: &str) -> Result<ResourceKind> {
        let kind = ResourceKind::from_slug(resource)
            .ok_or_else(|| anyhow!("unknown resource: {}", resource))?;
        self.gate(&kind.admin_path()).await?;
        Ok(kind)
    }

    async fn list(
        &self,
        resource: &str,
        search: &str,
        status: Option<&str>,
        online: Option<&str>,
    ) -> Result<String> {
        let kind = self.admin_screen(resource).await?;
        let backend = self.session.backend().clone();
        let mut out = String::new();

        match kind {
            ResourceKind::Devices => {
                let page = DevicesPage::new(backend);
                let fetched = page.manager().refresh().await;
                let filter = DeviceFilter {
                    status: status.map(StatusFilter::from).unwrap_or_default(),
                    online: online.map(OnlineFilter::try_from).transpose()?.unwrap_or_default(),
                };
                let stats = page.stats().await;
                let table = page.table(search, &filter).await;
                let _ = writeln!(
                    out,
                    "{} devices, {} online, {} offline, {} active, {} readings, battery {:.0}%, signal {:.0}%\n",
                    stats.total,
                    stats.online,
                    stats.offline,
                    stats.active,
                    stats.total_readings,
                    stats.average_battery,
                    stats.average_signal
                );
                let _ = writeln!(out, "Devices ({})\n{}", table.len(), table);
                self.finish(&mut out, page.manager(), fetched).await;
            }
            ResourceKind::Subscriptions => {
                let page = SubscriptionsPage::new(backend);
                let fetched = page.manager().refresh().await;
                let status = status
                    .filter(|s| !s.eq_ignore_ascii_case("all"))
                    .map(|s| SubscriptionStatus::from(s.to_uppercase()));
                let stats = page.stats().await;
                let table = page.table(search, status.as_ref()).await;
                let _ = writeln!(
                    out,
                    "{} subscriptions, {} active, {} expired, revenue {}, {} pending payments, {} auto-renew\n",
                    stats.total,
                    stats.active,
                    stats.expired,
                    format_usd(stats.revenue),
                    stats.pending_payments,
                    stats.auto_renew
                );
                let _ = writeln!(out, "Subscriptions ({})\n{}", table.len(), table);
                self.finish(&mut out, page.manager(), fetched).await;
            }
            kind => {
                if status.is_some() || online.is_some() {
                    bail!("--status and --online only apply to devices and subscriptions");
                }
                let screen = screen_for(kind, backend);
                let fetched = screen.refresh().await;
                let table = screen.table(search).await;
                let _ = writeln!(out, "{} ({})\n{}", screen.title(), table.len(), table);
                self.finish(&mut out, screen.as_ref(), fetched).await;
            }
        }
        Ok(out)
    }

    /// Appends the error banner and toasts a screen left behind.
    async fn finish(
        &self,
        out: &mut String,
        screen: &dyn Screen,
        fetched: common::error::ConsoleResult<()>,
    ) {
        if fetched.is_err() {
            if let Some(banner) = screen.error().await {
                let _ = writeln!(out, "{}", banner);
            }
        }
        push_toasts(out, &screen.take_notifications().await);
    }

    async fn loaded_screen(&self, resource: &str) -> Result<Arc<dyn Screen>> {
        let kind = self.admin_screen(resource).await?;
        let screen = screen_for(kind, self.session.backend().clone());
        screen.refresh().await?;
        Ok(screen)
    }

    async fn save(&self, resource: &str, id: Option<Id>, assignments: &[String]) -> Result<String> {
        let screen = self.loaded_screen(resource).await?;
        screen.load_lookups().await;
        match id {
            Some(id) => screen.open_edit(id).await?,
            None => screen.open_create().await,
        }
        let fields = screen.fields().await;
        for raw in assignments {
            let (name, value) =
                parse_assignment(raw).ok_or_else(|| anyhow!("expected FIELD=VALUE, got {}", raw))?;
            let field = fields.iter().find(|f| f.name == name).ok_or_else(|| {
                let known: Vec<&str> = fields.iter().map(|f| f.name).collect();
                anyhow!("{} has no field {} (fields: {})", screen.title(), name, known.join(", "))
            })?;
            if let FieldKind::Select(options) = &field.kind {
                if !options.iter().any(|(v, _)| v == value) {
                    let choices: Vec<String> =
                        options.iter().map(|(v, l)| format!("{} ({})", v, l)).collect();
                    bail!("{} must be one of: {}", field.label, choices.join(", "));
                }
            }
            screen.set_field(name, field.parse_input(value)).await?;
        }

        let result = screen.submit().await;
        let mut out = String::new();
        push_toasts(&mut out, &screen.take_notifications().await);
        result?;
        Ok(out)
    }

    async fn delete(&self, resource: &str, id: Id, yes: bool) -> Result<String> {
        let screen = self.loaded_screen(resource).await?;
        screen.request_delete(id).await?;
        if !yes {
            bail!("this cannot be undone; pass --yes to delete {} {}", resource, id);
        }
        let result = screen.confirm_delete().await;
        let mut out = String::new();
        push_toasts(&mut out, &screen.take_notifications().await);
        result?;
        Ok(out)
    }

    async fn toggle(&self, resource: &str, id: Id) -> Result<String> {
        let kind = self.admin_screen(resource).await?;
        let backend = self.session.backend().clone();
        let mut out = String::new();
        match kind {
            ResourceKind::Devices => {
                let page = DevicesPage::new(backend);
                page.manager().refresh().await?;
                let result = page.toggle_status(id).await;
                push_toasts(&mut out, &page.manager().take_notifications().await);
                result?;
            }
            ResourceKind::Subscriptions => {
                let page = SubscriptionsPage::new(backend);
                page.manager().refresh().await?;
                let result = page.toggle_status(id).await;
                push_toasts(&mut out, &page.manager().take_notifications().await);
                result?;
            }
            other => bail!("{} has no status toggle", other),
        }
        Ok(out)
    }

    async fn dashboard(&self) -> Result<String> {
        self.gate("/admin").await?;
        let summary = dashboard::load(self.session.backend().as_ref()).await;
        Ok(summary.to_string())
    }
}
