//! INI file session store adapter.
//!
//! One `{session}.ini` file per session under a base directory, holding
//! the portfolio balances. A missing file means the session has never been
//! saved; the caller decides what a fresh state looks like.

use crate::domain::error::ZenithError;
use crate::domain::portfolio::PortfolioState;
use crate::ports::session_port::SessionPort;
use configparser::ini::Ini;
use std::fs;
use std::path::PathBuf;

pub struct FileSessionAdapter {
    base_path: PathBuf,
}

impl FileSessionAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn session_path(&self, session: &str) -> PathBuf {
        self.base_path.join(format!("{}.ini", session))
    }

    fn read_field(ini: &Ini, key: &str) -> Result<f64, ZenithError> {
        ini.getfloat("portfolio", key)
            .ok()
            .flatten()
            .ok_or_else(|| ZenithError::SessionStore {
                reason: format!("missing or invalid [portfolio] {key}"),
            })
    }
}

impl SessionPort for FileSessionAdapter {
    fn load(&self, session: &str) -> Result<Option<PortfolioState>, ZenithError> {
        let path = self.session_path(session);
        if !path.exists() {
            return Ok(None);
        }

        let mut ini = Ini::new();
        ini.load(&path).map_err(|e| ZenithError::SessionStore {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let state = PortfolioState {
            cash_balance: Self::read_field(&ini, "cash_balance")?,
            asset_units: Self::read_field(&ini, "asset_units")?,
            starting_capital: Self::read_field(&ini, "starting_capital")?,
        };
        if state.cash_balance < 0.0 || state.asset_units < 0.0 {
            return Err(ZenithError::SessionStore {
                reason: format!("negative balances in {}", path.display()),
            });
        }
        Ok(Some(state))
    }

    fn save(&self, session: &str, state: &PortfolioState) -> Result<(), ZenithError> {
        fs::create_dir_all(&self.base_path)?;
        let content = format!(
            "[portfolio]\n\
             cash_balance = {}\n\
             asset_units = {}\n\
             starting_capital = {}\n",
            state.cash_balance, state.asset_units, state.starting_capital
        );
        fs::write(self.session_path(session), content)?;
        Ok(())
    }
}
