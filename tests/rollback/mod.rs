mod rollback_to_revision;
