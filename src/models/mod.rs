mod task;

pub use task::{
    CreateTaskRequest, DeleteResponse, HealthcheckResponse, Task, UpdateTaskRequest,
};
