//! 会话存储
//!
//! 进程内的 会话ID → 会话状态 映射，不落盘
//!
//! 锁只在读写状态的瞬间持有，调用模型期间不持有锁

use std::collections::HashMap;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::models::SessionState;

/// 会话 ID
pub type SessionId = Uuid;

/// 默认最多同时保留的会话数
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, SessionState>>,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: Duration::minutes(ttl_minutes),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    /// 设置会话数上限，满员时新建会话会挤掉最久未活动的会话
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// 取得已有会话或新建会话；`id` 为空或已失效时分配新 ID
    pub async fn resolve(&self, id: Option<SessionId>) -> SessionId {
        let mut sessions = self.sessions.lock().await;
        self.prune_locked(&mut sessions);

        if let Some(id) = id {
            if let Some(state) = sessions.get_mut(&id) {
                state.touch();
                return id;
            }
        }

        if sessions.len() >= self.max_sessions {
            evict_oldest(&mut sessions);
        }

        let id = Uuid::new_v4();
        sessions.insert(id, SessionState::new());
        debug!("创建新会话: {}", id);
        id
    }

    /// 在锁内读写某个会话的状态
    pub async fn with_session<R>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut SessionState) -> R,
    ) -> R {
        let mut sessions = self.sessions.lock().await;
        let state = sessions.entry(id).or_default();
        state.touch();
        f(state)
    }

    /// 读取会话快照
    pub async fn snapshot(&self, id: SessionId) -> SessionState {
        self.with_session(id, |state| state.clone()).await
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    fn prune_locked(&self, sessions: &mut HashMap<SessionId, SessionState>) {
        let cutoff = Utc::now() - self.ttl;
        let before = sessions.len();
        sessions.retain(|_, state| state.last_seen >= cutoff);
        let removed = before - sessions.len();
        if removed > 0 {
            debug!("回收 {} 个过期会话", removed);
        }
    }
}

fn evict_oldest(sessions: &mut HashMap<SessionId, SessionState>) {
    let oldest = sessions
        .iter()
        .min_by_key(|(_, state)| state.last_seen)
        .map(|(id, _)| *id);
    if let Some(id) = oldest {
        sessions.remove(&id);
        debug!("会话数已满，挤掉最久未活动的会话: {}", id);
    }
}
