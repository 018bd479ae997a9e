//! Command handlers.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use budgetly_client::{
    ApiClient, AssistantClient, AuthClient, BudgetStore, BudgetView, CategoryEditSession,
    Conversation, HttpBudgetStore, InMemoryBudgetStore,
};
use budgetly_core::budget::{BillItem, Category, DebtItem, SavingsItem, SubItem};
use budgetly_shared::{Amount, BudgetPeriod};
use tracing::info;

use crate::render;

pub struct App {
    api: ApiClient,
    offline: bool,
    store: Arc<dyn BudgetStore>,
}

impl App {
    pub fn new(api: ApiClient, offline: bool) -> Self {
        let store: Arc<dyn BudgetStore> = if offline {
            Arc::new(InMemoryBudgetStore::new())
        } else {
            Arc::new(HttpBudgetStore::new(api.clone()))
        };
        Self {
            api,
            offline,
            store,
        }
    }

    fn auth(&self) -> AuthClient {
        AuthClient::new(self.api.clone())
    }

    fn require_backend(&self, command: &str) -> Result<()> {
        if self.offline {
            bail!("`{command}` needs the backend; drop --offline");
        }
        Ok(())
    }

    /// Loads the stored token. Offline mode needs none.
    fn require_session(&self) -> Result<()> {
        if self.offline {
            return Ok(());
        }
        if !self.api.session().resume()? {
            bail!("Not logged in. Run `budgetly login` first.");
        }
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        self.require_backend("login")?;
        let user = self.auth().login(email, password).await?;
        println!("Logged in as {}", display_name(&user.name, &user.email));
        Ok(())
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<()> {
        self.require_backend("register")?;
        self.auth().register(email, password, name).await?;
        println!("Account created. Run `budgetly login` to sign in.");
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.auth().logout();
        println!("Logged out.");
        Ok(())
    }

    pub async fn whoami(&self) -> Result<()> {
        self.require_backend("whoami")?;
        match self.auth().restore().await? {
            Some(user) => println!("{}", display_name(&user.name, &user.email)),
            None => println!("Not logged in."),
        }
        Ok(())
    }

    async fn loaded_view(&self, period: BudgetPeriod) -> Result<BudgetView> {
        self.require_session()?;
        let view = BudgetView::new(self.store.clone(), period);
        view.load(period)
            .await
            .with_context(|| format!("could not load the budget for {period}"))?;
        Ok(view)
    }

    pub async fn show(&self, period: BudgetPeriod) -> Result<()> {
        let view = self.loaded_view(period).await?;
        print!("{}", render::overview(&view));
        Ok(())
    }

    pub async fn set_total(&self, period: BudgetPeriod, input: &str) -> Result<()> {
        let view = self.loaded_view(period).await?;
        let amount = Amount::parse_lenient(input);
        view.set_total_amount(amount).await?;
        info!(%period, %amount, "Total budget updated");
        print!("{}", render::overview(&view));
        Ok(())
    }

    pub async fn edit(
        &self,
        category: Category,
        period: BudgetPeriod,
        assignments: &[String],
    ) -> Result<()> {
        self.require_session()?;
        match category {
            Category::Expenses => self.edit_items::<BillItem>(period, assignments).await?,
            Category::Debt => self.edit_items::<DebtItem>(period, assignments).await?,
            Category::Savings => self.edit_items::<SavingsItem>(period, assignments).await?,
        }
        let view = self.loaded_view(period).await?;
        print!("{}", render::overview(&view));
        Ok(())
    }

    async fn edit_items<K: SubItem>(&self, period: BudgetPeriod, assignments: &[String]) -> Result<()> {
        let parsed = assignments
            .iter()
            .map(|raw| parse_assignment::<K>(raw))
            .collect::<Result<Vec<_>>>()?;

        let mut session = CategoryEditSession::<K>::open(self.store.clone(), period).await?;
        for (item, input) in parsed {
            session.editor_mut().set_input(item, input);
        }
        print!("{}", render::breakdown(session.editor()));
        if assignments.is_empty() {
            return Ok(());
        }
        session.save().await?;
        Ok(())
    }

    pub async fn chat(&self, period: BudgetPeriod, message: &str) -> Result<()> {
        if message.trim().is_empty() {
            println!("Try asking:");
            for question in Conversation::quick_questions() {
                println!("  - {question}");
            }
            return Ok(());
        }
        self.require_backend("chat")?;
        let view = self.loaded_view(period).await?;
        let assistant = AssistantClient::new(self.api.clone());
        let mut conversation = Conversation::new();

        if let Some(reply) = conversation
            .send(&assistant, message, &view.snapshot())
            .await
        {
            println!("{}", reply.content);
        }
        if let Some(error) = conversation.error() {
            eprintln!("({error})");
        }
        Ok(())
    }

    pub async fn chat_clear(&self) -> Result<()> {
        self.require_backend("chat-clear")?;
        self.require_session()?;
        let assistant = AssistantClient::new(self.api.clone());
        Conversation::new().clear(&assistant).await?;
        println!("Chat cleared.");
        Ok(())
    }
}

fn display_name(name: &str, email: &str) -> String {
    if name.is_empty() {
        email.to_string()
    } else {
        format!("{name} <{email}>")
    }
}

/// Parses `key=value` where `key` is one of `K`'s wire keys.
fn parse_assignment<K: SubItem>(raw: &str) -> Result<(K, &str)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("expected item=amount, got `{raw}`");
    };
    let Some(item) = K::from_key(key.trim()) else {
        let valid: Vec<&str> = K::ALL.iter().map(|item| item.key()).collect();
        bail!(
            "unknown {} item `{key}`; expected one of: {}",
            K::CATEGORY.label().to_lowercase(),
            valid.join(", ")
        );
    };
    Ok((item, value))
}
