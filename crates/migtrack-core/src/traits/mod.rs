//! Repository traits

mod repositories;

pub use repositories::{
    AnnouncementFilter, AnnouncementRepository, ApplicationFilter, ApplicationRepository,
    ApplicationSort, AuditLogFilter, AuditLogRepository, AuditStatistics, AuditWindow,
    ColumnSchema, DashboardFilter, DashboardStats, NotificationRepository, Patch, QueryOutput,
    QueryRepository, RepoResult, RollbackOutcome, SortOrder, SubTaskFilter, SubTaskRepository,
    TableSchema, TaskAssignmentFilter, TaskAssignmentRepository, UserCount, UserRepository,
};
