use crate::agent::Agent;
use crate::model::ModelProvider;
use std::sync::Arc;

pub struct ServerState<P: ModelProvider> {
    agent: Arc<Agent<P>>,
}

impl<P: ModelProvider> ServerState<P> {
    pub fn new(agent: Arc<Agent<P>>) -> Self {
        Self { agent }
    }

    pub(crate) fn agent(&self) -> &Agent<P> {
        &self.agent
    }
}
