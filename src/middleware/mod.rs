pub mod gate;

pub use gate::{
    create_user_gate, find_user_gate, remove_user_gate, run_gate, sign_in_gate, update_user_gate, Admission,
    GateInput, PayloadSource, RequestValidator, SignInValidator, StaticValidator, UpdateValidator,
    ValidatedPayload,
};
