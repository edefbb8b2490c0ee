use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::{
    activity::{ActivityStore, MemoryActivityStore},
    calendar::CalendarClient,
    config::Config,
    euler::{HttpProblemFetcherBuilder, MemoryProblemStore, ProblemService, ProblemStore},
    site::IndexPage,
    storage::PgStorage,
};

#[derive(Clone)]
pub struct AppState {
    pub euler: ProblemService,
    pub activities: Arc<dyn ActivityStore>,
    pub calendar: Option<Arc<CalendarClient>>,
    pub index_html: Arc<str>,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self> {
        let (problems, activities): (Arc<dyn ProblemStore>, Arc<dyn ActivityStore>) =
            match &config.database_url {
                Some(url) => {
                    let storage =
                        Arc::new(PgStorage::new(url, config.pool_size, config.problem_id).await?);
                    let problems: Arc<dyn ProblemStore> = storage.clone();
                    let activities: Arc<dyn ActivityStore> = storage;
                    (problems, activities)
                }
                None => {
                    warn!("DATABASE_URL not set, keeping state in memory");
                    let problems: Arc<dyn ProblemStore> = Arc::new(MemoryProblemStore::new(
                        config.problem_id,
                        config.start_number,
                    ));
                    let activities: Arc<dyn ActivityStore> =
                        Arc::new(MemoryActivityStore::default());
                    (problems, activities)
                }
            };

        let fetcher = HttpProblemFetcherBuilder::default()
            .base_url(&config.euler_base_url)
            .timeout(config.fetch_timeout())
            .build()?;

        let calendar = config.calendar_client().map(Arc::new);
        if calendar.is_none() {
            info!("Calendar credentials not set, calendar endpoint disabled");
        }

        let index_html = IndexPage::new(&config.api_url).generate()?;

        Ok(Self {
            euler: ProblemService::new(problems, Arc::new(fetcher)),
            activities,
            calendar,
            index_html: index_html.into(),
        })
    }
}
