use std::sync::Arc;

use crate::domain::{
    ports::outbound::{AuthProvider, RowStore},
    services::{
        CapacityService, ChargeService, MilestoneService, OrganisationService, PlanningService, ProjectService,
        ResourceService, SettingsService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub app_url: String,
    pub default_weeks: usize,
    /// Whether session cookies are marked `Secure`.
    pub secure_cookies: bool,
    pub auth: Arc<dyn AuthProvider>,
    pub organisation: Arc<OrganisationService>,
    pub resources: Arc<ResourceService>,
    pub projects: Arc<ProjectService>,
    pub charges: Arc<ChargeService>,
    pub capacities: Arc<CapacityService>,
    pub milestones: Arc<MilestoneService>,
    pub settings: Arc<SettingsService>,
    pub planning: Arc<PlanningService>,
}

impl AppState {
    /// Builds every service on top of one row store.
    pub fn new(
        app_url: String,
        default_weeks: usize,
        store: Arc<dyn RowStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        let organisation = Arc::new(OrganisationService::new(store.clone()));
        let resources = Arc::new(ResourceService::new(store.clone()));
        let projects = Arc::new(ProjectService::new(store.clone()));
        let charges = Arc::new(ChargeService::new(store.clone()));
        let capacities = Arc::new(CapacityService::new(store.clone()));
        let milestones = Arc::new(MilestoneService::new(store.clone()));
        let settings = Arc::new(SettingsService::new(store));
        let planning = Arc::new(PlanningService::new(
            organisation.clone(),
            resources.clone(),
            projects.clone(),
            charges.clone(),
            capacities.clone(),
            milestones.clone(),
        ));

        Self {
            secure_cookies: app_url.starts_with("https://"),
            app_url,
            default_weeks,
            auth,
            organisation,
            resources,
            projects,
            charges,
            capacities,
            milestones,
            settings,
            planning,
        }
    }
}
