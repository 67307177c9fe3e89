mod switch_branch;
