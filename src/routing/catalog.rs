//! Built-in operation catalogue.
//!
//! Every operation the frontend may invoke, keyed by the `apiRoute` value it
//! sends. Kept in one flat list so additions are a one-line diff.

use crate::routing::Method;

/// `(operation identifier, backend path, method)`.
pub const BUILTIN_OPERATIONS: &[(&str, &str, Method)] = &[
    // Authentication
    ("login", "/auth/login/", Method::Post),
    ("logout", "/auth/logout/", Method::Post),
    ("register", "/auth/register/", Method::Post),
    ("getCsrfToken", "/auth/csrf/", Method::Get),
    ("getCurrentUser", "/auth/user/", Method::Get),
    ("changePassword", "/auth/password/change/", Method::Post),
    ("requestPasswordReset", "/auth/password/reset/", Method::Post),
    ("confirmPasswordReset", "/auth/password/reset/confirm/", Method::Post),
    ("verifyEmail", "/auth/email/verify/", Method::Post),
    // Profile
    ("getProfile", "/profile/", Method::Get),
    ("updateProfile", "/profile/update/", Method::Post),
    ("uploadAvatar", "/profile/avatar/", Method::Post),
    ("deleteAccount", "/profile/delete/", Method::Post),
    // Organisations & members
    ("listMembers", "/members/", Method::Get),
    ("inviteMember", "/members/invite/", Method::Post),
    ("updateMemberRole", "/members/role/", Method::Post),
    ("removeMember", "/members/remove/", Method::Post),
    // Projects
    ("listProjects", "/projects/", Method::Get),
    ("getProject", "/projects/detail/", Method::Get),
    ("createProject", "/projects/create/", Method::Post),
    ("updateProject", "/projects/update/", Method::Post),
    ("archiveProject", "/projects/archive/", Method::Post),
    ("deleteProject", "/projects/delete/", Method::Post),
    // Tasks
    ("listTasks", "/tasks/", Method::Get),
    ("createTask", "/tasks/create/", Method::Post),
    ("updateTask", "/tasks/update/", Method::Post),
    ("deleteTask", "/tasks/delete/", Method::Post),
    ("reorderTasks", "/tasks/reorder/", Method::Post),
    ("assignTask", "/tasks/assign/", Method::Post),
    ("completeTask", "/tasks/complete/", Method::Post),
    // Checklists (drag-reorder lists)
    ("listChecklistItems", "/checklists/items/", Method::Get),
    ("createChecklistItem", "/checklists/items/create/", Method::Post),
    ("reorderChecklistItems", "/checklists/items/reorder/", Method::Post),
    ("deleteChecklistItem", "/checklists/items/delete/", Method::Post),
    // Contacts
    ("listContacts", "/contacts/", Method::Get),
    ("createContact", "/contacts/create/", Method::Post),
    ("updateContact", "/contacts/update/", Method::Post),
    ("deleteContact", "/contacts/delete/", Method::Post),
    ("importContacts", "/contacts/import/", Method::Post),
    // Documents & attachments
    ("listDocuments", "/documents/", Method::Get),
    ("uploadDocument", "/documents/upload/", Method::Post),
    ("downloadDocument", "/documents/download/", Method::Post),
    ("deleteDocument", "/documents/delete/", Method::Post),
    ("uploadAttachment", "/attachments/upload/", Method::Post),
    // Invoices
    ("listInvoices", "/invoices/", Method::Get),
    ("createInvoice", "/invoices/create/", Method::Post),
    ("updateInvoice", "/invoices/update/", Method::Post),
    ("generateInvoicePdf", "/invoices/pdf/", Method::Post),
    ("sendInvoiceEmail", "/invoices/send/", Method::Post),
    // Reports & charts
    ("getDashboardStats", "/reports/dashboard/", Method::Get),
    ("getRevenueChart", "/reports/charts/revenue/", Method::Get),
    ("getActivityChart", "/reports/charts/activity/", Method::Get),
    ("exportReportPdf", "/reports/export/pdf/", Method::Post),
    // Messaging
    ("sendEmail", "/messaging/email/send/", Method::Post),
    ("sendFeedback", "/messaging/feedback/", Method::Post),
    ("submitContactForm", "/messaging/contact/", Method::Post),
    // Notifications
    ("listNotifications", "/notifications/", Method::Get),
    ("markNotificationRead", "/notifications/read/", Method::Post),
    // Settings
    ("getSettings", "/settings/", Method::Get),
    ("updateSettings", "/settings/update/", Method::Post),
];
