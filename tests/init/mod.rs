mod init_repository;
