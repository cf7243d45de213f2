use async_trait::async_trait;
use mockall::mock;
use teewatch_core::{
    errors::WatchResult,
    models::{ExecutionLog, Schedule},
};

use crate::{
    agent::{AgentCapability, AgentResponse},
    schedules::ScheduleProxy,
};

// Mock agent for testing the check cycle without the agent service
mock! {
    pub Agent {}

    #[async_trait]
    impl AgentCapability for Agent {
        async fn invoke(&self, prompt: &str, agent_id: &str) -> eyre::Result<AgentResponse>;
    }
}

// Mock scheduler for testing code that controls the check schedule
mock! {
    pub Scheduler {}

    #[async_trait]
    impl ScheduleProxy for Scheduler {
        async fn list(&self) -> WatchResult<Vec<Schedule>>;

        async fn logs(&self, schedule_id: &str, limit: usize) -> WatchResult<Vec<ExecutionLog>>;

        async fn pause(&self, schedule_id: &str) -> WatchResult<()>;

        async fn resume(&self, schedule_id: &str) -> WatchResult<()>;

        async fn trigger_now(&self, schedule_id: &str) -> WatchResult<()>;
    }
}
