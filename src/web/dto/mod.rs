//! Request/response DTOs for the Depot web API.

pub mod request;
pub mod response;
pub mod validation;

pub use validation::ValidatedJson;

pub use request::{
    ListFilesQuery, RenameFileRequest, SendPasscodeRequest, UpdateCollaboratorsRequest,
    VerifyPasscodeRequest,
};
pub use response::{
    download_url, ApiResponse, FileResponse, KindUsageResponse, OwnerResponse,
    SendPasscodeResponse, SessionResponse, UsageResponse, UserResponse,
};
