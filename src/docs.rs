use crate::api::AttendanceView;
use crate::api::attendance::ClockReq;
use crate::api::correction::{DecisionReq, RequestStatusQuery};
use crate::api::report::SummaryQuery;
use crate::attendance::day_state::ClockAction;
use crate::model::attendance::AttendanceRecord;
use crate::model::correction_request::{CorrectionRequest, RequestStatus};
use crate::model::user::UserProfile;
use crate::models::{LoginReqDto, LoginResponse, RegisterReq};
use crate::service::attendance::{DirectCorrection, NewRecordInput};
use crate::service::correction::CorrectionInput;
use crate::service::report::{AttendanceSummary, SummaryRow};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kintai API",
        version = "1.0.0",
        description = r#"
## Attendance tracking

Employees clock in and out, record one break per day, and file correction
requests for days they got wrong. Administrators approve or reject those
requests, correct records directly, and pull work-hour summaries.

### Security
Everything outside `/auth` requires a **JWT Bearer** access token.
Admin endpoints additionally require the admin role.

### Response Format
Errors are returned as `{"message": "..."}`.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,

        crate::api::attendance::list_attendance,
        crate::api::attendance::today,
        crate::api::attendance::clock,

        crate::api::correction::create_request,
        crate::api::correction::list_own,
        crate::api::correction::list_all,
        crate::api::correction::decide,

        crate::api::admin::list_users,
        crate::api::admin::create_record,
        crate::api::admin::correct_record,

        crate::api::report::attendance_summary
    ),
    components(
        schemas(
            RegisterReq,
            LoginReqDto,
            LoginResponse,
            UserProfile,
            AttendanceRecord,
            AttendanceView,
            ClockReq,
            ClockAction,
            CorrectionInput,
            CorrectionRequest,
            RequestStatus,
            RequestStatusQuery,
            DecisionReq,
            DirectCorrection,
            NewRecordInput,
            SummaryQuery,
            SummaryRow,
            AttendanceSummary
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Attendance", description = "Clock events and own records"),
        (name = "Correction", description = "Correction request workflow"),
        (name = "Admin", description = "Administrator record management"),
        (name = "Report", description = "Attendance reporting"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
