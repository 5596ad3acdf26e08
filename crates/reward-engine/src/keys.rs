//! 存储键生成
//!
//! 键名与既有数据保持兼容，不可随意更改：
//!
//! | 键 | 类型 | 含义 |
//! |----|------|------|
//! | `conditions:active` | set | 当前激活的条件 |
//! | `condition:{condition}:rewards` | set | 条件关联的奖励 id |
//! | `rewards:id:{id}` | hash | 奖励定义 |
//! | `rewards:id:{id}:rewards` | hash | 奖励载荷 |
//! | `uid:{uid}:rewards` | zset | 用户领取计数，member 为奖励 id |

/// 键空间
///
/// 可选前缀用于多套部署共用一个 Redis 库，未设置前缀时键名与上表完全一致。
#[derive(Debug, Clone, Default)]
pub struct KeySpace {
    prefix: Option<String>,
}

impl KeySpace {
    pub fn new(prefix: Option<String>) -> Self {
        Self {
            prefix: prefix.filter(|p| !p.is_empty()),
        }
    }

    fn key(&self, raw: String) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, raw),
            None => raw,
        }
    }

    pub fn active_conditions(&self) -> String {
        self.key("conditions:active".to_string())
    }

    pub fn condition_rewards(&self, condition: &str) -> String {
        self.key(format!("condition:{}:rewards", condition))
    }

    pub fn reward(&self, reward_id: &str) -> String {
        self.key(format!("rewards:id:{}", reward_id))
    }

    pub fn reward_payload(&self, reward_id: &str) -> String {
        self.key(format!("rewards:id:{}:rewards", reward_id))
    }

    pub fn user_rewards(&self, uid: &str) -> String {
        self.key(format!("uid:{}:rewards", uid))
    }
}
