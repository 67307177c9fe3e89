use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::GibleError;

impl Repository {
    /// New branch pointing at HEAD's commit
    pub async fn create_branch(&self, name: &str) -> anyhow::Result<ObjectId> {
        self.create_branch_at(name, None).await
    }

    /// New branch pointing at the commit `start` names, HEAD's when `None`
    pub async fn create_branch_at(&self, name: &str, start: Option<&str>) -> anyhow::Result<ObjectId> {
        let branch_name = BranchName::try_parse(name)?;
        let _lock = self.lock().await?;

        let oid = match start {
            Some(start) => self.resolve(start).await?,
            None => {
                let current = self.refs().current_branch()?;
                self.refs()
                    .read_head()?
                    .ok_or_else(|| GibleError::UnbornHead(current.to_string()))?
            }
        };

        self.refs().create_branch(&branch_name, &oid)?;

        Ok(oid)
    }

    /// Remove a branch other than the active one; returns its last commit
    pub async fn delete_branch(&self, name: &str) -> anyhow::Result<Option<ObjectId>> {
        let branch_name = BranchName::try_parse(name)?;
        let _lock = self.lock().await?;

        if !self.refs().branch_exists(&branch_name) {
            return Err(GibleError::UnknownBranch(branch_name.to_string()).into());
        }
        if self.refs().is_current_branch(&branch_name)? {
            return Err(GibleError::ActiveBranch(branch_name.to_string()).into());
        }

        self.refs().delete_branch(&branch_name)
    }

    /// Every branch with its commit, sorted by name
    pub async fn list_branches(&self) -> anyhow::Result<Vec<(BranchName, Option<ObjectId>)>> {
        let mut branches = Vec::new();
        for branch in self.refs().list_branches()? {
            let oid = self.refs().read_branch(&branch)?;
            branches.push((branch, oid));
        }

        Ok(branches)
    }

    pub async fn current_branch(&self) -> anyhow::Result<BranchName> {
        self.refs().current_branch()
    }
}
