use crate::auth::verify_login;
use crate::models::User;
use crate::routes::{guard, Navigation};
use crate::AppState;
use tauri::State;

#[tauri::command]
pub async fn login(state: State<'_, AppState>, username: String, password: String) -> Result<User, String> {
    let delay = state.auth.lock().map_err(|e| e.to_string())?.login_delay();
    let user = verify_login(&username, &password, delay)
        .await
        .map_err(|e| e.to_string())?;

    let mut auth = state.auth.lock().map_err(|e| e.to_string())?;
    auth.establish(user.clone()).map_err(|e| e.to_string())?;

    Ok(user)
}

#[tauri::command]
pub fn logout(state: State<'_, AppState>) -> Result<(), String> {
    let mut auth = state.auth.lock().map_err(|e| e.to_string())?;
    auth.logout().map_err(|e| e.to_string())?;

    // The next cashier starts from an empty register
    let mut register = state.register.lock().map_err(|e| e.to_string())?;
    *register = Default::default();

    Ok(())
}

#[tauri::command]
pub fn current_user(state: State<'_, AppState>) -> Result<Option<User>, String> {
    let auth = state.auth.lock().map_err(|e| e.to_string())?;
    Ok(auth.current_user().cloned())
}

#[tauri::command]
pub fn resolve_route(state: State<'_, AppState>, path: String) -> Result<Navigation, String> {
    let auth = state.auth.lock().map_err(|e| e.to_string())?;
    Ok(guard(&path, auth.current_user()))
}
