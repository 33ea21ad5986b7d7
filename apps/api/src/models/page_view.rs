/// Request metadata captured for one public view.
#[derive(Debug, Clone, Default)]
pub struct NewPageView {
    pub referrer: String,
    pub user_agent: Option<String>,
}
